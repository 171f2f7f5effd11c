use crate::config::types::{
    Config, CrawlerConfig, EnrichmentConfig, JobsConfig, OutputConfig, WebhookConfig,
};
use crate::ConfigError;
use url::Url;

const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_enrichment_config(&config.enrichment)?;
    validate_output_config(&config.output)?;
    validate_webhook_config(&config.webhook)?;
    validate_jobs_config(&config.jobs)?;
    Ok(())
}

/// Validates crawler budgets
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_links_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max_links_per_page must be >= 1, got {}",
            config.max_links_per_page
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates enrichment configuration
fn validate_enrichment_config(config: &EnrichmentConfig) -> Result<(), ConfigError> {
    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    if config.retry_attempts < 1 || config.retry_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be between 1 and 10, got {}",
            config.retry_attempts
        )));
    }

    if config.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
        return Err(ConfigError::Validation(format!(
            "retry_backoff_ms must be <= {}, got {}",
            MAX_RETRY_BACKOFF_MS, config.retry_backoff_ms
        )));
    }

    validate_http_url("endpoint", &config.endpoint)
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_webhook_config(config: &WebhookConfig) -> Result<(), ConfigError> {
    if let Some(url) = &config.url {
        validate_http_url("webhook url", url)?;
    }
    Ok(())
}

fn validate_jobs_config(config: &JobsConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 64, got {}",
            config.max_workers
        )));
    }
    Ok(())
}

/// Requires an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
