//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client
//! - GET requests with a per-request timeout and user agent
//! - Classifying responses into restricted, non-HTML and usable pages

use crate::config::Config;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Status codes meaning the crawler was denied or throttled
pub const RESTRICTED_STATUS: &[u16] = &[401, 403, 429, 503];

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// An HTML page was received (the status may still be an error code)
    Page {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The site refused or throttled the request
    Restricted {
        /// The HTTP status code
        status_code: u16,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// A response arrived but its body could not be read
    BodyError {
        /// Error description
        error: String,
    },

    /// No response (connection refused, timeout, DNS, TLS)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Whether the server answered at all
    pub fn responded(&self) -> bool {
        !matches!(self, Self::NetworkError { .. })
    }
}

/// Builds the HTTP client shared by crawls and webhook delivery
///
/// The default user agent comes from the `[user-agent]` section; crawls send
/// their own per request, so one client can serve sites with different
/// settings.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
///
/// | Condition | Result |
/// |-----------|--------|
/// | transport failure or timeout | `NetworkError` |
/// | 401, 403, 429, 503 | `Restricted` |
/// | Content-Type without `text/html` | `ContentMismatch` |
/// | body read failure | `BodyError` |
/// | otherwise | `Page` |
pub async fn fetch_url(
    client: &Client,
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> FetchResult {
    let response = match client
        .get(url)
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status_code = response.status().as_u16();
    if RESTRICTED_STATUS.contains(&status_code) {
        return FetchResult::Restricted { status_code };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        return FetchResult::ContentMismatch { content_type };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Page {
            final_url,
            status_code,
            body,
        },
        Err(e) => FetchResult::BodyError {
            error: e.to_string(),
        },
    }
}
