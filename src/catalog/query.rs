//! Catalog queries for consumers of the feed
//!
//! Search matches the changelog title or the tag, case-insensitively.
//! Date bounds are inclusive calendar days in UTC. A record whose
//! `published_at` is missing or unparsable is never excluded by a date bound.

use chrono::{DateTime, NaiveDate, Utc};

use super::ReleaseRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseFilter {
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReleaseFilter {
    pub fn matches(&self, record: &ReleaseRecord) -> bool {
        self.matches_search(record) && self.matches_dates(record)
    }

    fn matches_search(&self, record: &ReleaseRecord) -> bool {
        let needle = match self.search.as_deref() {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        record.changelog.title.to_lowercase().contains(&needle)
            || record.tag_name.to_lowercase().contains(&needle)
    }

    fn matches_dates(&self, record: &ReleaseRecord) -> bool {
        let Some(day) = published_day(record) else {
            return true;
        };
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }
        true
    }
}

/// UTC calendar day a record was published on
pub fn published_day(record: &ReleaseRecord) -> Option<NaiveDate> {
    let published = record.published_at.as_deref()?;
    DateTime::parse_from_rfc3339(published)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// Records matching `filter`, in catalog order
pub fn filter_releases<'a>(records: &'a [ReleaseRecord], filter: &ReleaseFilter) -> Vec<&'a ReleaseRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

// ============================================================================
// Asset Platforms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPlatform {
    Windows,
    Linux,
}

impl AssetPlatform {
    /// Builds are Windows unless the file name says linux
    pub fn from_asset_name(name: &str) -> Self {
        if name.to_lowercase().contains("linux") {
            AssetPlatform::Linux
        } else {
            AssetPlatform::Windows
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssetPlatform::Windows => "Windows",
            AssetPlatform::Linux => "Linux",
        }
    }
}
