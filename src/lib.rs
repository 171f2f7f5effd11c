//! Contact-Harvest: a bounded contact crawler with model-assisted enrichment
//!
//! This crate crawls a small neighbourhood of a website breadth-first, mines
//! email addresses and phone numbers from every HTML page it reaches, and then
//! asks a text-completion service to validate each finding and label it with a
//! short human-readable role.

pub mod completion;
pub mod config;
pub mod contact;
pub mod crawler;
pub mod enrich;
pub mod extract;
pub mod jobs;
pub mod output;
pub mod session;
pub mod url;

use thiserror::Error;

/// Main error type for Contact-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Job {0} not found")]
    JobNotFound(String),

    #[error("Job worker failed: {0}")]
    Worker(String),
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

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Contact-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlSettings};
pub use contact::{Contact, ContactKind, CrawlStatus};
pub use crawler::{CrawlResult, Crawler};
pub use enrich::Enricher;
pub use jobs::{Job, JobId, JobRegistry, JobRunner, JobStatus};
pub use session::{harvest_sites, run_pipeline, SessionReport};
