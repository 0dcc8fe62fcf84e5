//! HTTP client wrapper for the GitHub REST API
//!
//! Every request is a single blocking GET. There is no retry: a request
//! either yields decoded JSON or an error, and an exhausted rate limit is
//! reported as the fatal [`CatalogError::RateLimited`].

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::logging::{log_debug, log_fetch};

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

/// Read access to the GitHub API.
///
/// `path` is relative to the API root, e.g. `repos/{owner}/{repo}/releases?page=1`.
pub trait GithubApi {
    fn get_json(&self, path: &str) -> Result<Value>;
}

// ============================================================================
// Rate Limit Snapshot
// ============================================================================

/// The `X-RateLimit-*` headers of one response, verbatim
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimit {
    pub remaining: Option<String>,
    pub limit: Option<String>,
    pub reset: Option<String>,
}

impl RateLimit {
    pub fn from_headers<F>(header: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            remaining: header("X-RateLimit-Remaining"),
            limit: header("X-RateLimit-Limit"),
            reset: header("X-RateLimit-Reset"),
        }
    }

    fn from_response(response: &ureq::Response) -> Self {
        Self::from_headers(|name| response.header(name).map(str::to_string))
    }

    /// True only when the remaining header is present and reads zero
    pub fn is_exhausted(&self) -> bool {
        self.remaining
            .as_deref()
            .and_then(|r| r.trim().parse::<u64>().ok())
            == Some(0)
    }

    /// Fail the run once the quota is gone
    pub fn check(&self) -> Result<()> {
        if self.is_exhausted() {
            return Err(CatalogError::RateLimited {
                limit: self.limit.clone().unwrap_or_else(|| "?".to_string()),
                reset: self.reset.clone().unwrap_or_else(|| "?".to_string()),
            });
        }
        Ok(())
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} remaining, resets at {}",
            self.remaining.as_deref().unwrap_or("?"),
            self.limit.as_deref().unwrap_or("?"),
            self.reset.as_deref().unwrap_or("?"),
        )
    }
}

// ============================================================================
// ureq Client
// ============================================================================

pub struct GithubClient {
    agent: ureq::Agent,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &CatalogConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();

        let token = config.token();
        if token.is_some() {
            log_debug(&format!("Using {} for authentication", config.token_env));
        } else {
            log_debug(&format!(
                "{} not set, sending unauthenticated requests",
                config.token_env
            ));
        }

        Self {
            agent,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

impl GithubApi for GithubClient {
    fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);
        log_fetch(&format!("Requesting {}", url));

        let mut request = self.agent.get(&url).set("Accept", ACCEPT_GITHUB_JSON);
        if let Some(ref token) = self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                // GitHub answers an exhausted quota with 403/429, so the
                // headers still decide whether this is the fatal case
                let rate = RateLimit::from_response(&response);
                log_debug(&format!("Rate limit: {}", rate));
                rate.check()?;
                return Err(CatalogError::Status { url, status });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(CatalogError::Transport {
                    url,
                    message: transport.to_string(),
                });
            }
        };

        let rate = RateLimit::from_response(&response);
        log_debug(&format!("Rate limit: {}", rate));
        rate.check()?;

        let status = response.status();
        let text = response.into_string()?;
        log_debug(&format!(
            "Response status: {}, length: {} bytes",
            status,
            text.len()
        ));

        Ok(serde_json::from_str(&text)?)
    }
}
