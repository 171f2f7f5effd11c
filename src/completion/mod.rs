//! Text-completion service boundary
//!
//! The enrichment code depends only on [`CompletionService`]: a prompt goes
//! in, and text comes back with a status, an optional incompleteness reason
//! and token usage. [`OpenAiService`] speaks the OpenAI Responses API;
//! [`CompletionClient`] adds retries with exponential backoff on top of any
//! service.

mod client;
mod openai;

pub use client::CompletionClient;
pub use openai::OpenAiService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use thiserror::Error;

/// Message fragments that mark an error as transient
const TRANSIENT_VOCABULARY: &[&str] = &["rate", "timeout", "timed out", "overload", "temporar", "quota"];

/// Status reported by a service for a fully generated answer
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_output_tokens: Option<u32>,
}

/// Token accounting reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn is_empty(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0 && self.total_tokens == 0
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated text, trimmed
    pub text: String,

    /// Service status, e.g. `completed` or `incomplete`
    pub status: String,

    pub incomplete_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion service is not configured: {0}")]
    NotConfigured(String),

    /// Failure the caller knows to be transient (truncated or empty output)
    #[error("Retryable completion failure: {0}")]
    Retryable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

impl CompletionError {
    /// Whether a retry may succeed
    ///
    /// True for [`CompletionError::Retryable`] and for any error whose
    /// message mentions rate limiting, timeouts, overload, temporary
    /// unavailability or quota.
    pub fn is_retryable(&self) -> bool {
        if matches!(self, Self::Retryable(_)) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        TRANSIENT_VOCABULARY.iter().any(|token| message.contains(token))
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        CompletionError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(e: serde_json::Error) -> Self {
        CompletionError::Decode(e.to_string())
    }
}

/// A text-completion backend
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Short name used in logs and notes
    fn name(&self) -> &str;

    /// Whether credentials are present; checked before any request
    fn is_configured(&self) -> bool;

    async fn request(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError>;
}
