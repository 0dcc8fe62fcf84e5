//! Merge strategies for folding freshly fetched releases into the catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::processor::{process_releases, ProcessOptions};
use super::Catalog;
use crate::error::Result;
use crate::github::{fetch_releases, fetch_releases_until, GithubApi};
use crate::logging::log_debug;

/// How an existing catalog is refreshed from the primary repository
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Refetch every page and add tags not yet in the catalog.
    /// Existing records are never refreshed.
    #[default]
    FullRescan,
    /// Fetch newest-first until the first already-cataloged tag, then stop.
    /// Assumes upstream only ever appends; edits and backfills go unseen.
    Incremental,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::FullRescan => "full-rescan",
            MergeStrategy::Incremental => "incremental",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "full-rescan" | "full" => Ok(MergeStrategy::FullRescan),
            "incremental" => Ok(MergeStrategy::Incremental),
            other => Err(format!(
                "unknown merge strategy '{}' (expected full-rescan or incremental)",
                other
            )),
        }
    }
}

// ============================================================================
// Merge Operations
// ============================================================================

/// Build the initial catalog from every bootstrap repository, in order.
/// A tag seen in an earlier repository wins over later ones.
pub fn bootstrap(
    api: &dyn GithubApi,
    repos: &[String],
    per_page: u32,
    options: &ProcessOptions,
) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    for repo in repos {
        let raw = fetch_releases(api, repo, per_page)?;
        let processed = process_releases(api, &raw, options)?;
        let processed_len = processed.len();
        let added = catalog.append_new(processed);
        log_debug(&format!(
            "Adding {} releases from {} ({} duplicates skipped)",
            added,
            repo,
            processed_len - added
        ));
    }
    Ok(catalog)
}

/// Fold the primary repository's releases into `catalog` using `strategy`.
/// Returns the number of records added.
pub fn merge_into(
    catalog: &mut Catalog,
    api: &dyn GithubApi,
    repo: &str,
    per_page: u32,
    strategy: MergeStrategy,
    options: &ProcessOptions,
) -> Result<usize> {
    let added = match strategy {
        MergeStrategy::FullRescan => {
            let raw = fetch_releases(api, repo, per_page)?;
            let processed = process_releases(api, &raw, options)?;
            catalog.append_new(processed)
        }
        MergeStrategy::Incremental => {
            let raw = fetch_releases_until(api, repo, per_page, |r| catalog.contains(&r.tag_name))?;
            let processed = process_releases(api, &raw, options)?;
            catalog.prepend_new(processed)
        }
    };
    log_debug(&format!("Total new releases added: {}", added));
    Ok(added)
}
