//! tb-harvest: a forum release harvester
//!
//! This crate crawls a release forum, pulls magnet links out of its threads,
//! parses the free-text release titles and files every episode into a
//! show → season → episode catalog kept in a key-value store.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod release;
pub mod store;

use thiserror::Error;

/// Main error type for tb-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl HarvestError {
    /// Returns true if the error came from the store
    ///
    /// Store failures are treated as fatal by the scheduler; everything else
    /// only ends the operation that raised it.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for tb-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{show_id_for, CatalogReader, CatalogWriter, MagnetLink};
pub use config::Config;
pub use release::{parse_title, StructuredRelease};
pub use store::{SqliteStore, Store};
