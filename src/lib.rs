//! Canary Catalog - GitHub release feed builder
//!
//! Library crate for fetching canary build releases from GitHub and keeping a
//! deduplicated, newest-first JSON catalog of them.
//! Note: the command line front-end (`cli`) is only built with the "full" feature.

pub mod catalog;
#[cfg(feature = "full")]
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod updater;

pub use catalog::{Catalog, ReleaseRecord};
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use updater::{update_catalog, UpdateSummary};
