use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::merge::MergeStrategy;
use crate::error::{CatalogError, Result};

/// GitHub caps `per_page` at 100
pub const MAX_PER_PAGE: u32 = 100;

// ============================================================================
// Catalog Config
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file, read for merge decisions and rewritten at the end of every run
    pub output_path: PathBuf,
    /// Repository scanned on every run once a catalog exists
    pub primary_repo: String,
    /// Repositories fetched in full when no catalog exists yet, in priority order
    pub bootstrap_repos: Vec<String>,
    /// Repository whose commits the release tags point at (changelog fallback)
    pub commit_repo: String,
    pub merge_strategy: MergeStrategy,
    pub api_base: String,
    /// Environment variable holding an optional bearer token
    pub token_env: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub per_page: u32,
    /// Assets are kept only if their name contains this (case-insensitive)
    pub asset_marker: String,
    /// Emit the release web page as `url` on every record
    pub include_url: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("data/canary_releases.json"),
            primary_repo: "xenia-canary/xenia-canary-releases".to_string(),
            bootstrap_repos: vec![
                "xenia-canary/xenia-canary-releases".to_string(),
                "xenia-canary/xenia-canary".to_string(),
            ],
            commit_repo: "xenia-canary/xenia-canary".to_string(),
            merge_strategy: MergeStrategy::default(),
            api_base: "https://api.github.com".to_string(),
            token_env: "AUTH_TOKEN".to_string(),
            user_agent: format!("canary-catalog/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 20,
            per_page: MAX_PER_PAGE,
            asset_marker: "xenia".to_string(),
            include_url: true,
            log_file: None,
        }
    }
}

impl CatalogConfig {
    /// Load a TOML config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CatalogConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject settings that would make the run misbehave instead of failing loudly
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(CatalogError::Config(format!(
                "per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE, self.per_page
            )));
        }
        if self.asset_marker.trim().is_empty() {
            return Err(CatalogError::Config("asset_marker must not be empty".to_string()));
        }
        if self.bootstrap_repos.is_empty() {
            return Err(CatalogError::Config(
                "at least one bootstrap repository is required".to_string(),
            ));
        }

        let repos = std::iter::once(&self.primary_repo)
            .chain(std::iter::once(&self.commit_repo))
            .chain(self.bootstrap_repos.iter());
        for repo in repos {
            if !is_repo_slug(repo) {
                return Err(CatalogError::Config(format!(
                    "repository '{}' is not of the form owner/name",
                    repo
                )));
            }
        }
        Ok(())
    }

    /// Bearer token from the configured environment variable, if set and non-empty
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn is_repo_slug(repo: &str) -> bool {
    match repo.split_once('/') {
        Some((owner, name)) => !owner.is_empty() && !name.is_empty() && !name.contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.per_page, 100);
        assert_eq!(config.bootstrap_repos[0], config.primary_repo);
        assert_eq!(config.merge_strategy, MergeStrategy::FullRescan);
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canary.toml");
        fs::write(
            &path,
            r#"
output_path = "site/releases.json"
merge_strategy = "incremental"
per_page = 50
"#,
        )
        .unwrap();

        let config = CatalogConfig::load(&path).unwrap();
        assert_eq!(config.output_path, PathBuf::from("site/releases.json"));
        assert_eq!(config.merge_strategy, MergeStrategy::Incremental);
        assert_eq!(config.per_page, 50);
        // Untouched keys keep their defaults
        assert_eq!(config.asset_marker, "xenia");
        assert_eq!(config.token_env, "AUTH_TOKEN");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canary.toml");
        fs::write(&path, "per_page = \"lots\"").unwrap();
        assert!(matches!(CatalogConfig::load(&path), Err(CatalogError::Toml(_))));
    }

    #[test]
    fn test_validate_per_page_bounds() {
        let mut config = CatalogConfig::default();
        config.per_page = 0;
        assert!(config.validate().is_err());
        config.per_page = 101;
        assert!(config.validate().is_err());
        config.per_page = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_repo_slugs() {
        let mut config = CatalogConfig::default();
        config.primary_repo = "just-a-name".to_string();
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.bootstrap_repos = vec!["owner/name/extra".to_string()];
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.bootstrap_repos.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_from_env() {
        let mut config = CatalogConfig::default();
        config.token_env = "CANARY_CATALOG_TEST_TOKEN_UNSET".to_string();
        assert_eq!(config.token(), None);

        config.token_env = "CANARY_CATALOG_TEST_TOKEN_SET".to_string();
        std::env::set_var("CANARY_CATALOG_TEST_TOKEN_SET", "  abc123 ");
        assert_eq!(config.token(), Some("abc123".to_string()));

        std::env::set_var("CANARY_CATALOG_TEST_TOKEN_SET", "");
        assert_eq!(config.token(), None);
    }
}
