//! Configuration module for Contact-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an empty file yields the crawler defaults.
//!
//! # Example
//!
//! ```no_run
//! use contact_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlSettings, CrawlerConfig, EnrichmentConfig, ExportFormat, JobsConfig,
    OutputConfig, UserAgentConfig, WebhookConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
