//! Turns raw GitHub releases into catalog records
//!
//! Per release: drop experimental tags, keep only marker-named assets (and
//! drop the release if none remain), split the body into a changelog, and
//! fall back to the tagged commit's message when the body is empty.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{Changelog, ReleaseAsset, ReleaseRecord};
use crate::error::Result;
use crate::github::{GithubApi, GithubCommit, GithubRelease};
use crate::logging::{log_debug, log_warning};

/// Everything but RFC 3986 unreserved characters is escaped in a ref segment
const REF_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Per-run processing settings, borrowed from the config
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions<'a> {
    pub asset_marker: &'a str,
    pub commit_repo: &'a str,
    pub include_url: bool,
}

// ============================================================================
// Filters
// ============================================================================

pub fn is_experimental(tag: &str) -> bool {
    let lower = tag.to_lowercase();
    lower.contains("canary_experimental") || lower == "experimental"
}

/// Assets whose name contains `marker`, case-insensitively, in upstream order
pub fn matching_assets(release: &GithubRelease, marker: &str) -> Vec<ReleaseAsset> {
    let marker = marker.to_lowercase();
    release
        .assets
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&marker))
        .map(|a| ReleaseAsset {
            name: a.name.clone(),
            url: a.browser_download_url.clone(),
        })
        .collect()
}

// ============================================================================
// Changelog Extraction
// ============================================================================

/// Title is everything before the first blank line, changes everything after
pub fn split_changelog(body: &str) -> Changelog {
    let body = body.replace("\r\n", "\n");
    match body.split_once("\n\n") {
        Some((title, changes)) => Changelog {
            title: title.trim().to_string(),
            changes: changes.trim().to_string(),
        },
        None => Changelog {
            title: body.trim().to_string(),
            changes: String::new(),
        },
    }
}

/// First line of a commit message is the title (verbatim), the rest are the changes
pub fn parse_commit_message(message: &str) -> Changelog {
    let mut lines = message.lines();
    let title = lines.next().unwrap_or("").to_string();
    let changes = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    Changelog { title, changes }
}

fn commit_path(repo: &str, tag: &str) -> String {
    format!(
        "repos/{}/commits/{}",
        repo,
        utf8_percent_encode(tag, REF_SEGMENT_ENCODE_SET)
    )
}

pub fn fetch_commit_changelog(api: &dyn GithubApi, repo: &str, tag: &str) -> Result<Changelog> {
    let value = api.get_json(&commit_path(repo, tag))?;
    let commit: GithubCommit = serde_json::from_value(value)?;
    Ok(parse_commit_message(&commit.commit.message))
}

/// Changelog for a release, using the tagged commit when the body yields nothing.
/// A failed commit lookup leaves the changelog empty unless the failure is fatal.
fn release_changelog(api: &dyn GithubApi, release: &GithubRelease, commit_repo: &str) -> Result<Changelog> {
    let changelog = split_changelog(release.body.as_deref().unwrap_or(""));
    if !changelog.is_empty() {
        return Ok(changelog);
    }

    let tag = &release.tag_name;
    log_debug(&format!("No changelog for {}, fetching commit info from {}", tag, commit_repo));
    match fetch_commit_changelog(api, commit_repo, tag) {
        Ok(changelog) => Ok(changelog),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            log_warning(&format!("Failed to fetch commit for {}@{}: {}", commit_repo, tag, e));
            Ok(Changelog::default())
        }
    }
}

// ============================================================================
// Processing
// ============================================================================

/// Filter and reshape `raw` into catalog records, preserving input order
pub fn process_releases(
    api: &dyn GithubApi,
    raw: &[GithubRelease],
    options: &ProcessOptions,
) -> Result<Vec<ReleaseRecord>> {
    let mut records = Vec::new();

    for release in raw {
        let tag = &release.tag_name;
        if is_experimental(tag) {
            log_debug(&format!("Skipping experimental release: {}", tag));
            continue;
        }

        let assets = matching_assets(release, options.asset_marker);
        if assets.is_empty() {
            log_debug(&format!("Skipping release {} because it has no matching assets", tag));
            continue;
        }

        let changelog = release_changelog(api, release, options.commit_repo)?;

        log_debug(&format!("Prepared release {} with {} assets", tag, assets.len()));
        records.push(ReleaseRecord {
            tag_name: tag.clone(),
            published_at: release.published_at.clone(),
            url: if options.include_url { release.html_url.clone() } else { None },
            changelog,
            assets,
        });
    }

    Ok(records)
}
