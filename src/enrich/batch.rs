//! Batch submission with prompt escalation and bisection
//!
//! Each batch moves through three states: the lenient prompt, the strict
//! prompt, then a split into two halves that are retried independently.
//! A single-contact batch that fails both prompts is a terminal failure.

use crate::completion::{CompletionClient, Usage};
use crate::contact::Contact;
use crate::enrich::prompt::build_prompt;
use crate::enrich::response::{parse_contacts_response, ResultItem};
use crate::enrich::EnrichError;
use std::future::Future;
use std::pin::Pin;

/// Output-token cap derived from the batch size
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenBudget {
    /// Hard cap; 0 leaves the service default in place
    pub max_output_tokens: u32,
    pub tokens_per_contact: u32,
}

impl TokenBudget {
    const FLOOR: u32 = 400;
    const BASE: u32 = 200;

    /// `min(max, max(400, 200 + n * per_contact))`, or `None` without a cap
    pub fn estimate(&self, contacts: usize) -> Option<u32> {
        if self.max_output_tokens == 0 {
            return None;
        }
        let wanted = Self::BASE.saturating_add((contacts as u32).saturating_mul(self.tokens_per_contact));
        Some(self.max_output_tokens.min(wanted.max(Self::FLOOR)))
    }
}

/// Verdicts for a whole batch, in batch order
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub results: Vec<ResultItem>,
    pub usage: Usage,
}

impl BatchOutcome {
    fn append(mut self, other: BatchOutcome) -> Self {
        self.results.extend(other.results);
        self.usage += other.usage;
        self
    }
}

type BatchFuture<'a> = Pin<Box<dyn Future<Output = Result<BatchOutcome, EnrichError>> + Send + 'a>>;

/// Obtains one verdict per contact, splitting the batch on failure
///
/// Recursion depth is bounded by `ceil(log2(n))`.
pub fn query_batch<'a>(
    client: &'a CompletionClient,
    batch: &'a [Contact],
    budget: TokenBudget,
) -> BatchFuture<'a> {
    Box::pin(async move {
        if batch.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let error = match attempt(client, batch, false, budget).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.escalates() => {
                tracing::warn!("Lenient prompt failed for {} contacts: {}", batch.len(), e);
                match attempt(client, batch, true, budget).await {
                    Ok(outcome) => return Ok(outcome),
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };

        if batch.len() == 1 {
            return Err(error);
        }

        tracing::info!("Splitting batch of {} contacts after: {}", batch.len(), error);
        let (left, right) = batch.split_at(batch.len() / 2);
        let left = query_batch(client, left, budget).await?;
        let right = query_batch(client, right, budget).await?;

        Ok(left.append(right))
    })
}

async fn attempt(
    client: &CompletionClient,
    batch: &[Contact],
    strict: bool,
    budget: TokenBudget,
) -> Result<BatchOutcome, EnrichError> {
    let prompt = build_prompt(batch, strict);
    let response = client.call(&prompt, budget.estimate(batch.len())).await?;
    let results = parse_contacts_response(&response.text, batch.len())?;

    Ok(BatchOutcome {
        results,
        usage: response.usage,
    })
}
