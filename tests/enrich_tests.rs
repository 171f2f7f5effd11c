//! Integration tests for contact enrichment
//!
//! A scripted completion service stands in for the model so that escalation,
//! bisection and the missing-credential path can be observed call by call.

use async_trait::async_trait;
use contact_harvest::completion::{
    CompletionError, CompletionRequest, CompletionResponse, CompletionService, Usage,
};
use contact_harvest::config::EnrichmentConfig;
use contact_harvest::{Contact, Enricher};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy)]
enum Behaviour {
    /// Answers correctly, except batches of this size get one item too few
    ShortFor(usize),
    /// Always answers one item too few
    AlwaysShort,
    /// Rejects every request with a non-retryable API error
    Unauthorized,
    /// Replies with this text whatever the prompt
    Reply(&'static str),
}

struct CountingService {
    configured: bool,
    behaviour: Behaviour,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CountingService {
    fn new(configured: bool, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            configured,
            behaviour,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|p| contact_count(p))
            .collect()
    }
}

fn contact_count(prompt: &str) -> usize {
    let prompt: Value = serde_json::from_str(prompt).unwrap();
    prompt["contacts"].as_array().unwrap().len()
}

fn answer(items: usize) -> String {
    let contacts: Vec<Value> = (1..=items)
        .map(|index| {
            json!({
                "index": index,
                "valid": true,
                "description": "Press email",
                "reason": ""
            })
        })
        .collect();
    json!({ "contacts": contacts }).to_string()
}

#[async_trait]
impl CompletionService for CountingService {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn request(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        let size = contact_count(&request.prompt);
        let text = match self.behaviour {
            Behaviour::ShortFor(n) if n == size => answer(size - 1),
            Behaviour::ShortFor(_) => answer(size),
            Behaviour::AlwaysShort => answer(size - 1),
            Behaviour::Reply(text) => text.to_string(),
            Behaviour::Unauthorized => {
                return Err(CompletionError::Api {
                    status: 401,
                    message: "unauthorized".to_string(),
                })
            }
        };

        Ok(CompletionResponse {
            text,
            status: "completed".to_string(),
            incomplete_reason: None,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
        })
    }
}

fn enrichment_config() -> EnrichmentConfig {
    EnrichmentConfig {
        retry_attempts: 2,
        retry_backoff_ms: 1,
        ..EnrichmentConfig::default()
    }
}

fn three_contacts() -> Vec<Contact> {
    vec![
        Contact::email("press@example.com", "Press", "https://example.com/"),
        Contact::phone("+14155550123", "Call us", "https://example.com/contact"),
        Contact::email("jobs@example.com", "Careers", "https://example.com/jobs"),
    ]
}

#[tokio::test]
async fn test_short_answer_escalates_then_bisects() {
    let service = CountingService::new(true, Behaviour::ShortFor(3));
    let enricher = Enricher::new(service.clone(), &enrichment_config());

    let enrichment = enricher.enrich(three_contacts()).await;

    assert_eq!(service.calls(), 4);
    assert_eq!(service.batch_sizes(), vec![3, 3, 1, 2]);

    let prompts = service.prompts.lock().unwrap().clone();
    assert!(!prompts[0].contains("Reply with exactly one valid JSON object"));
    assert!(prompts[1].contains("Reply with exactly one valid JSON object"));

    assert_eq!(enrichment.contacts.len(), 3);
    assert_eq!(enrichment.contacts[0].value, "press@example.com");
    assert_eq!(enrichment.contacts[1].value, "+14155550123");
    assert_eq!(enrichment.contacts[2].value, "jobs@example.com");
    assert!(enrichment.contacts.iter().all(|c| c.validated == Some(true)));
    assert_eq!(
        enrichment.contacts[0].enriched_description.as_deref(),
        Some("Press email")
    );
    assert!(enrichment.notes.is_empty());
    assert_eq!(enrichment.usage.total_tokens, 30);
}

#[tokio::test]
async fn test_verdicts_set_validity_flags_and_notes() {
    let service = CountingService::new(
        true,
        Behaviour::Reply(
            r#"{"contacts": [
                {"index": 1, "valid": false, "description": "", "reason": " Placeholder address "},
                {"index": 2, "valid": true, "description": "Main phone line", "reason": ""},
                {"index": 3, "valid": true, "description": "  ", "reason": "Shared inbox"}
            ]}"#,
        ),
    );
    let enricher = Enricher::new(service.clone(), &enrichment_config());

    let enrichment = enricher.enrich(three_contacts()).await;

    assert_eq!(service.calls(), 1);
    let [press, phone, jobs] = enrichment.contacts.as_slice() else {
        panic!("expected three contacts, got {}", enrichment.contacts.len());
    };

    assert_eq!(press.validated, Some(false));
    assert!(press.flags.contains("Placeholder address"));
    assert_eq!(press.flags.len(), 1);
    assert!(press.enriched_description.is_none());

    assert_eq!(phone.validated, Some(true));
    assert!(phone.flags.is_empty());
    assert_eq!(phone.enriched_description.as_deref(), Some("Main phone line"));

    assert_eq!(jobs.validated, Some(true));
    assert!(jobs.flags.contains("Shared inbox"));
    assert!(jobs.enriched_description.is_none());

    assert_eq!(
        enrichment.notes,
        vec![
            "1 contact(s) were marked invalid by the model.".to_string(),
            "2 contact(s) received additional remarks.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_invalid_with_reason_adds_single_note() {
    let service = CountingService::new(
        true,
        Behaviour::Reply(
            r#"{"contacts": [
                {"index": 1, "valid": false, "description": "", "reason": "Not a real mailbox"},
                {"index": 2, "valid": true, "description": "Sales line", "reason": ""}
            ]}"#,
        ),
    );
    let enricher = Enricher::new(service.clone(), &enrichment_config());

    let contacts = three_contacts().into_iter().take(2).collect();
    let enrichment = enricher.enrich(contacts).await;

    assert_eq!(enrichment.contacts[0].validated, Some(false));
    assert!(enrichment.contacts[0].flags.contains("Not a real mailbox"));
    assert!(enrichment.contacts[0].enriched_description.is_none());
    assert_eq!(enrichment.contacts[1].validated, Some(true));
    assert!(enrichment.contacts[1].flags.is_empty());

    // the remark count equals the invalid count, so only one note
    assert_eq!(
        enrichment.notes,
        vec!["1 contact(s) were marked invalid by the model.".to_string()]
    );
}

#[tokio::test]
async fn test_unrecoverable_batch_returns_originals() {
    let service = CountingService::new(true, Behaviour::AlwaysShort);
    let enricher = Enricher::new(service.clone(), &enrichment_config());

    let input = three_contacts();
    let enrichment = enricher.enrich(input.clone()).await;

    // lenient + strict on the whole batch, then both prompts on the first half
    assert_eq!(service.batch_sizes(), vec![3, 3, 1, 1]);
    assert_eq!(enrichment.contacts, input);
    assert_eq!(enrichment.notes.len(), 1);
    assert!(enrichment.notes[0].contains("could not validate"));
}

#[tokio::test]
async fn test_hard_error_skips_strict_prompt() {
    let service = CountingService::new(true, Behaviour::Unauthorized);
    let enricher = Enricher::new(service.clone(), &enrichment_config());

    let input = three_contacts();
    let enrichment = enricher.enrich(input.clone()).await;

    assert_eq!(service.batch_sizes(), vec![3, 1]);
    assert_eq!(enrichment.contacts, input);
    assert_eq!(enrichment.notes.len(), 1);
}

#[tokio::test]
async fn test_missing_credentials_makes_no_calls() {
    let service = CountingService::new(false, Behaviour::ShortFor(0));
    let enricher = Enricher::new(service.clone(), &enrichment_config());

    let input = three_contacts();
    let enrichment = enricher.enrich(input.clone()).await;

    assert_eq!(service.calls(), 0);
    assert_eq!(enrichment.contacts, input);
    assert_eq!(enrichment.notes.len(), 1);
    assert!(enrichment.notes[0].contains("credentials are not configured"));
}

#[tokio::test]
async fn test_chunks_respect_request_limit() {
    let service = CountingService::new(true, Behaviour::ShortFor(0));
    let config = EnrichmentConfig {
        max_contacts_per_request: 2,
        ..enrichment_config()
    };
    let enricher = Enricher::new(service.clone(), &config);

    let enrichment = enricher.enrich(three_contacts()).await;

    assert_eq!(service.batch_sizes(), vec![2, 1]);
    assert_eq!(enrichment.contacts.len(), 3);
}

#[tokio::test]
async fn test_empty_input_is_a_no_op() {
    let service = CountingService::new(true, Behaviour::ShortFor(0));
    let enricher = Enricher::new(service.clone(), &enrichment_config());

    let enrichment = enricher.enrich(Vec::new()).await;

    assert_eq!(service.calls(), 0);
    assert!(enrichment.contacts.is_empty());
    assert!(enrichment.notes.is_empty());
}
