//! Error type shared by the client, processor and catalog stages

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("GitHub API rate limit reached ({limit} requests, resets at {reset}), stopping execution")]
    RateLimited { limit: String, reset: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Fatal errors abort the run even where a per-release failure would
    /// otherwise be absorbed (the changelog fallback).
    pub fn is_fatal(&self) -> bool {
        matches!(self, CatalogError::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
