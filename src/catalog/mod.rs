//! Release catalog
//!
//! The catalog is the ordered list of [`ReleaseRecord`]s persisted as one
//! pretty-printed JSON array. It is loaded at the start of a run, merged
//! with freshly processed releases, sorted, and rewritten wholesale.
//!
//! Invariants held by every [`Catalog`]:
//! - `tag_name` is unique
//! - every record has at least one asset

pub mod merge;
pub mod processor;
pub mod query;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use merge::MergeStrategy;
pub use processor::{process_releases, ProcessOptions};
pub use query::{filter_releases, AssetPlatform, ReleaseFilter};

// ============================================================================
// Record Types
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Changelog {
    pub title: String,
    #[serde(default)]
    pub changes: String,
}

impl Changelog {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.changes.is_empty()
    }
}

/// A downloadable build attached to a release
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub changelog: Changelog,
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseRecord {
    /// Sort key: missing dates compare as "" and land last when descending
    pub fn sort_key(&self) -> &str {
        self.published_at.as_deref().unwrap_or("")
    }

    /// Changelog title, or the tag when the release has no title
    pub fn display_title(&self) -> &str {
        if self.changelog.title.is_empty() {
            &self.tag_name
        } else {
            &self.changelog.title
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<ReleaseRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records, keeping the first record seen for each tag
    pub fn from_records(records: Vec<ReleaseRecord>) -> Self {
        let mut catalog = Self::new();
        catalog.append_new(records);
        catalog
    }

    /// Read the catalog file. `Ok(None)` means no catalog exists yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let records: Vec<ReleaseRecord> = serde_json::from_str(&content)?;
        Ok(Some(Self::from_records(records)))
    }

    /// Overwrite the catalog file with the full pretty-printed array
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Newest first by `published_at`. Stable, so equal dates keep their order.
    pub fn sort_newest_first(&mut self) {
        self.records.sort_by(|a, b| b.sort_key().cmp(a.sort_key()));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.records.iter().any(|r| r.tag_name == tag)
    }

    pub fn tags(&self) -> HashSet<&str> {
        self.records.iter().map(|r| r.tag_name.as_str()).collect()
    }

    pub fn records(&self) -> &[ReleaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records from `incoming` whose tag is not yet present, in order and
    /// without duplicates among themselves. Records without assets are dropped.
    fn unseen(&self, incoming: Vec<ReleaseRecord>) -> Vec<ReleaseRecord> {
        let mut seen: HashSet<String> = self.tags().into_iter().map(str::to_string).collect();
        incoming
            .into_iter()
            .filter(|r| !r.assets.is_empty() && seen.insert(r.tag_name.clone()))
            .collect()
    }

    /// Append records for tags not already present. Existing records are never
    /// replaced. Returns how many were added.
    pub fn append_new(&mut self, incoming: Vec<ReleaseRecord>) -> usize {
        let fresh = self.unseen(incoming);
        let added = fresh.len();
        self.records.extend(fresh);
        added
    }

    /// Insert records for tags not already present ahead of the existing ones.
    /// Returns how many were added.
    pub fn prepend_new(&mut self, incoming: Vec<ReleaseRecord>) -> usize {
        let mut fresh = self.unseen(incoming);
        let added = fresh.len();
        fresh.append(&mut self.records);
        self.records = fresh;
        added
    }
}
