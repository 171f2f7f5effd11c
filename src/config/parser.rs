use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Every section is optional; missing keys fall back to the crawler defaults.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use contact_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the file when a path is given, otherwise returns validated defaults
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
max-pages = 5
max-depth = 1
max-links-per-page = 10
request-timeout-secs = 3
delay-ms = 0

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[enrichment]
model = "gpt-test"
max-contacts-per-request = 8

[output]
directory = "./out"
format = "sqlite"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_pages, 5);
        assert_eq!(config.crawler.max_depth, 1);
        assert_eq!(config.crawler.delay_ms, 0);
        assert_eq!(
            config.user_agent.header_value(),
            "TestCrawler/1.0 (+https://example.com/about)"
        );
        assert_eq!(config.enrichment.model, "gpt-test");
        assert_eq!(config.enrichment.max_contacts_per_request, 8);
        assert_eq!(config.enrichment.retry_attempts, 3);
        assert_eq!(config.output.format, ExportFormat::Sqlite);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawler.max_pages, 20);
        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.max_links_per_page, 25);
        assert_eq!(config.crawler.delay_ms, 350);
        assert_eq!(config.enrichment.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.jobs.max_workers, 4);
        assert!(config.webhook.url.is_none());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
max-pages = 0
"#;
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_default_when_no_path() {
        let config = load_config_or_default(None).unwrap();
        assert_eq!(config.output.directory, "exports");
    }
}
