//! GitHub REST API access
//!
//! Typed views of the release and commit objects we read, the HTTP client
//! wrapper, and the paginated release fetcher.

pub mod client;
pub mod releases;
#[cfg(test)]
pub(crate) mod testing;

use serde::Deserialize;

pub use client::{GithubApi, GithubClient, RateLimit};
pub use releases::{fetch_releases, fetch_releases_until};

// ============================================================================
// Release Types
// ============================================================================

/// GitHub release metadata. Only the fields the catalog reads.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GithubRelease {
    #[serde(default)]
    pub tag_name: String,
    pub body: Option<String>,
    pub published_at: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

/// GitHub release asset
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
}

// ============================================================================
// Commit Types
// ============================================================================

/// Response of `GET /repos/{owner}/{repo}/commits/{ref}`
#[derive(Deserialize, Debug, Clone)]
pub struct GithubCommit {
    pub commit: CommitDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
}
