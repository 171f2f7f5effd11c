//! Contact enrichment
//!
//! Sends mined contacts to a completion service, which judges whether each
//! one is a real contact and labels its role. Service failures never reach
//! the caller: affected contacts come back unchanged together with a note.

mod batch;
mod prompt;
mod response;

pub use batch::{query_batch, BatchOutcome, TokenBudget};
pub use prompt::build_prompt;
pub use response::{parse_contacts_response, strip_code_fences, ResponseError, ResultItem};

use crate::completion::{CompletionClient, CompletionError, CompletionService, OpenAiService, Usage};
use crate::config::EnrichmentConfig;
use crate::contact::Contact;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

/// Why a batch could not be enriched
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl EnrichError {
    /// Whether the strict prompt is worth a try after this failure
    pub fn escalates(&self) -> bool {
        match self {
            Self::Completion(e) => e.is_retryable(),
            Self::Response(_) => true,
        }
    }
}

/// Enriched contacts plus notes explaining any degradation
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub contacts: Vec<Contact>,
    pub notes: Vec<String>,
    pub usage: Usage,
}

/// Validates and labels contacts through a completion service
#[derive(Clone)]
pub struct Enricher {
    client: CompletionClient,
    max_contacts_per_request: usize,
    budget: TokenBudget,
}

impl Enricher {
    pub fn new(service: Arc<dyn CompletionService>, config: &EnrichmentConfig) -> Self {
        Self {
            client: CompletionClient::from_config(service, config),
            max_contacts_per_request: config.max_contacts_per_request,
            budget: TokenBudget {
                max_output_tokens: config.max_output_tokens,
                tokens_per_contact: config.tokens_per_contact,
            },
        }
    }

    /// Enricher backed by the OpenAI Responses API
    pub fn from_config(http: Client, config: &EnrichmentConfig) -> Self {
        Self::new(Arc::new(OpenAiService::from_config(http, config)), config)
    }

    /// Enriches `contacts`, returning exactly as many contacts as given
    ///
    /// Without credentials no request is made and a single note says so.
    /// A chunk whose enrichment fails is returned untouched with a note.
    pub async fn enrich(&self, contacts: Vec<Contact>) -> Enrichment {
        if contacts.is_empty() {
            return Enrichment::default();
        }

        let service = self.client.service();
        if !service.is_configured() {
            let note = format!(
                "{} credentials are not configured; contacts are returned without enrichment.",
                service.name()
            );
            tracing::warn!("{}", note);
            return Enrichment {
                contacts,
                notes: vec![note],
                usage: Usage::default(),
            };
        }

        let step = match self.max_contacts_per_request {
            0 => contacts.len(),
            n => n,
        };

        let mut enriched = Vec::with_capacity(contacts.len());
        let mut notes = Vec::new();
        let mut usage = Usage::default();
        let mut invalid = 0usize;
        let mut flagged = 0usize;

        for chunk in contacts.chunks(step) {
            let outcome = match query_batch(&self.client, chunk, self.budget).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Enrichment failed for {} contacts: {}", chunk.len(), e);
                    notes.push(
                        "The model could not validate some contacts; the detected data is kept."
                            .to_string(),
                    );
                    enriched.extend_from_slice(chunk);
                    continue;
                }
            };

            usage += outcome.usage;

            for (contact, verdict) in chunk.iter().zip(outcome.results) {
                let mut contact = contact.clone();
                contact.validated = Some(verdict.valid);
                if !verdict.valid {
                    invalid += 1;
                }

                let description = verdict.description.trim();
                if !description.is_empty() {
                    contact.enriched_description = Some(description.to_string());
                }

                let reason = verdict.reason.trim();
                if !reason.is_empty() {
                    contact.flags.insert(reason.to_string());
                    flagged += 1;
                }

                enriched.push(contact);
            }
        }

        if invalid > 0 {
            notes.push(format!("{} contact(s) were marked invalid by the model.", invalid));
        }
        if flagged > 0 && flagged != invalid {
            notes.push(format!("{} contact(s) received additional remarks.", flagged));
        }

        if !usage.is_empty() {
            tracing::debug!(
                "Tokens used: input={} output={} total={}",
                usage.input_tokens,
                usage.output_tokens,
                usage.total_tokens
            );
        }

        Enrichment {
            contacts: enriched,
            notes,
            usage,
        }
    }
}
