//! Scripted in-memory GitHub API for unit tests

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{json, Value};

use super::client::GithubApi;
use crate::error::{CatalogError, Result};

/// Serves canned JSON by request path and records every path requested.
/// Unknown paths answer 404.
#[derive(Default)]
pub struct FakeGithub {
    responses: HashMap<String, Value>,
    rate_limited: Vec<String>,
    requests: RefCell<Vec<String>>,
}

impl FakeGithub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    /// Serve one page of `repos/{repo}/releases`
    pub fn with_release_page(self, repo: &str, per_page: u32, page: u32, releases: Value) -> Self {
        let path = format!("repos/{}/releases?per_page={}&page={}", repo, per_page, page);
        self.with_response(&path, releases)
    }

    pub fn with_commit(self, repo: &str, sha: &str, message: &str) -> Self {
        let path = format!("repos/{}/commits/{}", repo, sha);
        self.with_response(&path, json!({ "sha": sha, "commit": { "message": message } }))
    }

    /// Make `path` answer as if the quota were exhausted
    pub fn with_rate_limit_at(mut self, path: &str) -> Self {
        self.rate_limited.push(path.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl GithubApi for FakeGithub {
    fn get_json(&self, path: &str) -> Result<Value> {
        self.requests.borrow_mut().push(path.to_string());

        if self.rate_limited.iter().any(|p| p == path) {
            return Err(CatalogError::RateLimited {
                limit: "60".to_string(),
                reset: "1700000000".to_string(),
            });
        }

        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| CatalogError::Status {
                url: path.to_string(),
                status: 404,
            })
    }
}

/// A raw release object shaped like the GitHub API returns it
pub fn release_json(tag: &str, published_at: &str, body: Option<&str>, assets: &[&str]) -> Value {
    let assets: Vec<Value> = assets
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "browser_download_url": format!("https://github.com/dl/{}/{}", tag, name),
                "size": 1024
            })
        })
        .collect();

    json!({
        "tag_name": tag,
        "published_at": published_at,
        "html_url": format!("https://github.com/releases/tag/{}", tag),
        "body": body,
        "assets": assets
    })
}
