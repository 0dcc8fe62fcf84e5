//! Catalog updater
//!
//! One pass of the batch job: load the catalog (or bootstrap it), merge the
//! primary repository's releases, sort newest first, and rewrite the file.
//! Nothing is written unless every fetch succeeded.

use std::path::PathBuf;

use crate::catalog::merge::{bootstrap, merge_into};
use crate::catalog::{Catalog, ProcessOptions};
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::github::GithubApi;
use crate::logging::{log_debug, log_info};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSummary {
    pub total: usize,
    pub added: usize,
    pub bootstrapped: bool,
    pub output_path: PathBuf,
}

impl UpdateSummary {
    /// The one line printed to stdout on success
    pub fn message(&self) -> String {
        format!(
            "✅ Saved {} releases to {} ({} new)",
            self.total,
            self.output_path.display(),
            self.added
        )
    }
}

pub fn update_catalog(api: &dyn GithubApi, config: &CatalogConfig) -> Result<UpdateSummary> {
    config.validate()?;

    let options = ProcessOptions {
        asset_marker: &config.asset_marker,
        commit_repo: &config.commit_repo,
        include_url: config.include_url,
    };

    let (mut catalog, added, bootstrapped) = match Catalog::load(&config.output_path)? {
        None => {
            log_info("No existing catalog, fetching all releases from every bootstrap repository...");
            let catalog = bootstrap(api, &config.bootstrap_repos, config.per_page, &options)?;
            let added = catalog.len();
            (catalog, added, true)
        }
        Some(mut catalog) => {
            log_info(&format!(
                "Existing catalog with {} releases found, merging {} ({})",
                catalog.len(),
                config.primary_repo,
                config.merge_strategy
            ));
            let added = merge_into(
                &mut catalog,
                api,
                &config.primary_repo,
                config.per_page,
                config.merge_strategy,
                &options,
            )?;
            (catalog, added, false)
        }
    };

    log_debug(&format!("Total releases after update: {}", catalog.len()));
    catalog.sort_newest_first();
    catalog.save(&config.output_path)?;
    log_info(&format!(
        "Saved {} releases to {}",
        catalog.len(),
        config.output_path.display()
    ));

    Ok(UpdateSummary {
        total: catalog.len(),
        added,
        bootstrapped,
        output_path: config.output_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MergeStrategy;
    use crate::github::testing::{release_json, FakeGithub};
    use serde_json::json;
    use std::fs;

    const PRIMARY: &str = "owner/releases";
    const SOURCE: &str = "owner/source";

    fn test_config(dir: &std::path::Path, strategy: MergeStrategy) -> CatalogConfig {
        CatalogConfig {
            output_path: dir.join("data").join("canary_releases.json"),
            primary_repo: PRIMARY.to_string(),
            bootstrap_repos: vec![PRIMARY.to_string(), SOURCE.to_string()],
            commit_repo: SOURCE.to_string(),
            merge_strategy: strategy,
            ..CatalogConfig::default()
        }
    }

    fn tags(catalog: &Catalog) -> Vec<&str> {
        catalog.records().iter().map(|r| r.tag_name.as_str()).collect()
    }

    #[test]
    fn test_bootstrap_run_writes_sorted_union() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), MergeStrategy::FullRescan);
        let api = FakeGithub::new()
            .with_release_page(PRIMARY, 100, 1, json!([
                release_json("r2", "2024-02-01T00:00:00Z", Some("R2\n\nNotes"), &["xenia_canary.zip"]),
                release_json("experimental", "2024-05-01T00:00:00Z", Some("X"), &["xenia.zip"]),
            ]))
            .with_release_page(SOURCE, 100, 1, json!([
                release_json("s3", "2024-03-01T00:00:00Z", None, &["xenia_canary_linux.tar.gz"]),
                release_json("s1", "2024-01-01T00:00:00Z", Some("S1"), &["xenia.zip", "pdb.zip"]),
                release_json("tools", "2024-04-01T00:00:00Z", Some("T"), &["tools.zip"]),
            ]))
            .with_commit(SOURCE, "s3", "Fix crash\n\nDetails here");

        let summary = update_catalog(&api, &config).unwrap();
        assert!(summary.bootstrapped);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.added, 3);
        assert!(summary.message().contains("Saved 3 releases"));

        let catalog = Catalog::load(&config.output_path).unwrap().unwrap();
        assert_eq!(tags(&catalog), vec!["s3", "r2", "s1"]);
        assert_eq!(catalog.records()[0].changelog.title, "Fix crash");
        assert_eq!(catalog.records()[2].assets.len(), 1);
    }

    #[test]
    fn test_incremental_run_prepends_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), MergeStrategy::Incremental);
        Catalog::from_records(vec![crate::catalog::tests::record("v1.0", Some("2024-01-01T00:00:00Z"))])
            .save(&config.output_path)
            .unwrap();

        let api = FakeGithub::new().with_release_page(PRIMARY, 100, 1, json!([
            release_json("v1.2", "2024-03-01T00:00:00Z", Some("v1.2"), &["xenia.zip"]),
            release_json("v1.1", "2024-02-01T00:00:00Z", Some("v1.1"), &["xenia.zip"]),
            release_json("v1.0", "2024-01-01T00:00:00Z", Some("v1.0"), &["xenia.zip"]),
            release_json("v0.9", "2023-12-01T00:00:00Z", Some("v0.9"), &["xenia.zip"]),
        ]));

        let summary = update_catalog(&api, &config).unwrap();
        assert!(!summary.bootstrapped);
        assert_eq!(summary.added, 2);

        let catalog = Catalog::load(&config.output_path).unwrap().unwrap();
        assert_eq!(tags(&catalog), vec!["v1.2", "v1.1", "v1.0"]);
        // The bootstrap-only repo is not consulted once a catalog exists
        assert!(api.requests().iter().all(|p| p.starts_with("repos/owner/releases/")));
    }

    #[test]
    fn test_rate_limit_leaves_catalog_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), MergeStrategy::FullRescan);
        Catalog::from_records(vec![crate::catalog::tests::record("v1.0", Some("2024-01-01T00:00:00Z"))])
            .save(&config.output_path)
            .unwrap();
        let before = fs::read_to_string(&config.output_path).unwrap();

        let api = FakeGithub::new()
            .with_release_page(PRIMARY, 100, 1, json!([
                release_json("v1.1", "2024-02-01T00:00:00Z", None, &["xenia.zip"]),
            ]))
            .with_rate_limit_at("repos/owner/source/commits/v1.1");

        let err = update_catalog(&api, &config).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(fs::read_to_string(&config.output_path).unwrap(), before);
    }

    #[test]
    fn test_invalid_config_fails_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path(), MergeStrategy::FullRescan);
        config.per_page = 0;

        let api = FakeGithub::new();
        assert!(update_catalog(&api, &config).is_err());
        assert!(api.requests().is_empty());
        assert!(!config.output_path.exists());
    }
}
