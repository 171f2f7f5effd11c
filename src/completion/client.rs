use crate::completion::{
    CompletionError, CompletionRequest, CompletionResponse, CompletionService, STATUS_COMPLETED,
};
use crate::config::EnrichmentConfig;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on the sleep between two attempts
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Retrying front end for a [`CompletionService`]
///
/// Retryable failures are retried up to `attempts` times, sleeping
/// `backoff * 2^attempt` in between, capped at [`MAX_RETRY_DELAY`]. Any
/// other failure is returned at once.
#[derive(Clone)]
pub struct CompletionClient {
    service: Arc<dyn CompletionService>,
    attempts: u32,
    backoff: Duration,
}

impl CompletionClient {
    pub fn new(service: Arc<dyn CompletionService>, attempts: u32, backoff: Duration) -> Self {
        Self {
            service,
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(service: Arc<dyn CompletionService>, config: &EnrichmentConfig) -> Self {
        Self::new(service, config.retry_attempts, config.backoff())
    }

    pub fn service(&self) -> &dyn CompletionService {
        self.service.as_ref()
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        self.backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
    }

    /// Sends one prompt, retrying transient failures
    pub async fn call(
        &self,
        prompt: &str,
        max_output_tokens: Option<u32>,
    ) -> Result<CompletionResponse, CompletionError> {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            max_output_tokens,
        };

        let mut last_error = None;

        for attempt in 0..self.attempts {
            let outcome = self
                .service
                .request(&request)
                .await
                .and_then(check_complete);

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() => {
                    let delay = self.retry_delay(attempt);
                    tracing::warn!(
                        "{} retryable error (attempt {}/{}): {}",
                        self.service.name(),
                        attempt + 1,
                        self.attempts,
                        e
                    );
                    if attempt + 1 < self.attempts {
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| CompletionError::Retryable("retry attempts exhausted".to_string())))
    }
}

/// Rejects answers that look truncated
///
/// An answer flagged incomplete (by status or reason) is accepted only when
/// its text still ends with a closing brace. Empty text is never accepted.
fn check_complete(mut response: CompletionResponse) -> Result<CompletionResponse, CompletionError> {
    response.text = response.text.trim().to_string();
    let looks_whole = !response.text.is_empty() && response.text.ends_with('}');

    if !response.status.is_empty() && response.status != STATUS_COMPLETED {
        tracing::warn!("Response marked '{}'", response.status);
        if !looks_whole {
            return Err(CompletionError::Retryable(format!(
                "incomplete response (status={})",
                response.status
            )));
        }
    }

    if let Some(reason) = &response.incomplete_reason {
        tracing::warn!("Response incomplete: {}", reason);
        if !looks_whole {
            return Err(CompletionError::Retryable(format!(
                "incomplete response (reason={})",
                reason
            )));
        }
    }

    if response.text.is_empty() {
        return Err(CompletionError::Retryable("empty response".to_string()));
    }

    Ok(response)
}
