use serde::Deserialize;
use std::time::Duration;

/// Browser-like header sent when no explicit user agent is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_3) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// Main configuration structure for Contact-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Crawl budget and politeness configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages visited per site
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum link depth from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of ranked links followed from a single page
    #[serde(rename = "max-links-per-page", default = "default_max_links_per_page")]
    pub max_links_per_page: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Pause between successive page fetches (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            max_links_per_page: default_max_links_per_page(),
            request_timeout_secs: default_request_timeout(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAgentConfig {
    /// Full header value, used verbatim when present
    pub header: Option<String>,

    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: Option<String>,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: Option<String>,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Resolves the header value sent with every page request
    ///
    /// Format when built from parts: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        if let Some(header) = self.header.as_deref().filter(|h| !h.trim().is_empty()) {
            return header.to_string();
        }

        match (&self.crawler_name, &self.crawler_version) {
            (Some(name), Some(version)) => match &self.contact_url {
                Some(url) => format!("{}/{} (+{})", name, version, url),
                None => format!("{}/{}", name, version),
            },
            _ => DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Text-completion enrichment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Whether enrichment runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model name sent to the service
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Responses API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Upper bound for output tokens; 0 leaves it unset
    #[serde(rename = "max-output-tokens", default)]
    pub max_output_tokens: u32,

    /// Output token estimate per contact in a batch
    #[serde(rename = "tokens-per-contact", default)]
    pub tokens_per_contact: u32,

    /// Contacts per request; 0 submits the whole input as one batch
    #[serde(rename = "max-contacts-per-request", default)]
    pub max_contacts_per_request: usize,

    /// Attempts made by the completion client before giving up
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff delay, doubled per attempt (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Timeout for a single completion request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_completion_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: default_api_key_env(),
            model: default_model(),
            endpoint: default_endpoint(),
            max_output_tokens: 0,
            tokens_per_contact: 0,
            max_contacts_per_request: 0,
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_secs: default_completion_timeout(),
        }
    }
}

impl EnrichmentConfig {
    /// Reads the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Model name, with `OPENAI_MODEL` taking precedence over the file
    pub fn resolved_model(&self) -> String {
        std::env::var("OPENAI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.model.clone())
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Export format for the final contact list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Sqlite,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Sqlite => "db",
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving exported files
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Export file format
    #[serde(default)]
    pub format: ExportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: ExportFormat::default(),
        }
    }
}

/// Outbound webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Destination URL; delivery is skipped when absent
    pub url: Option<String>,

    /// Timeout for the POST request (seconds)
    #[serde(rename = "timeout-secs", default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_webhook_timeout(),
        }
    }
}

/// Background job configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Number of jobs allowed to run at the same time
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// Immutable settings for crawling one site
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub base_url: String,
    pub max_pages: u32,
    pub max_depth: u32,
    pub max_links_per_page: u32,
    pub request_timeout: Duration,
    pub delay: Duration,
    pub user_agent: String,
}

impl CrawlSettings {
    /// Derives the settings for one site from the loaded configuration
    pub fn for_site(config: &Config, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().to_string(),
            max_pages: config.crawler.max_pages,
            max_depth: config.crawler.max_depth,
            max_links_per_page: config.crawler.max_links_per_page,
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            delay: Duration::from_millis(config.crawler.delay_ms),
            user_agent: config.user_agent.header_value(),
        }
    }

    /// Settings with the reference defaults for the given site
    pub fn new(base_url: &str) -> Self {
        Self::for_site(&Config::default(), base_url)
    }
}

fn default_max_pages() -> u32 {
    20
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_links_per_page() -> u32 {
    25
}

fn default_request_timeout() -> u64 {
    10
}

fn default_delay_ms() -> u64 {
    350
}

fn default_true() -> bool {
    true
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-5-mini".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    800
}

fn default_completion_timeout() -> u64 {
    60
}

fn default_output_directory() -> String {
    "exports".to_string()
}

fn default_webhook_timeout() -> u64 {
    15
}

fn default_max_workers() -> usize {
    4
}
