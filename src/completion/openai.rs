use crate::completion::{
    CompletionError, CompletionRequest, CompletionResponse, CompletionService, Usage,
};
use crate::config::EnrichmentConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI Responses API backend
pub struct OpenAiService {
    client: Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiService {
    pub fn new(client: Client, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
            endpoint: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Builds the service from `[enrichment]`, reading the key from the environment
    pub fn from_config(client: Client, config: &EnrichmentConfig) -> Self {
        Self::new(client, config.api_key(), config.resolved_model())
            .with_endpoint(&config.endpoint)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for OpenAiService {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    async fn request(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CompletionError::NotConfigured("API key is not set".to_string()))?;

        let body = ResponsesRequest {
            model: &self.model,
            input: &request.prompt,
            max_output_tokens: request.max_output_tokens,
        };

        let resp = self
            .client
            .post(format!("{}/responses", self.endpoint))
            .bearer_auth(api_key.trim())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let envelope: ResponsesEnvelope = serde_json::from_str(&text)?;
        tracing::debug!("{} response status {:?}", self.name(), envelope.status);

        Ok(envelope.into_response())
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// The part of a Responses API answer this crate relies on
#[derive(Debug, Deserialize)]
struct ResponsesEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
    #[serde(default)]
    usage: Option<Usage>,
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesEnvelope {
    /// Joins the `output_text` parts of every completed output item
    fn into_response(self) -> CompletionResponse {
        let mut text = String::new();

        for item in self.output {
            if let Some(status) = item.status.as_deref() {
                if status != "completed" {
                    tracing::warn!("Skipping output item with status '{}'", status);
                    continue;
                }
            }
            for part in item.content {
                if part.kind == "output_text" {
                    if let Some(t) = part.text {
                        text.push_str(&t);
                    }
                }
            }
        }

        CompletionResponse {
            text: text.trim().to_string(),
            status: self.status.unwrap_or_default(),
            incomplete_reason: self.incomplete_details.and_then(|d| d.reason),
            usage: self.usage.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(300).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_joins_output_text() {
        let raw = r#"{
            "status": "completed",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "status": "completed", "content": [
                    {"type": "output_text", "text": "{\"contacts\":"},
                    {"type": "output_text", "text": " []}"}
                ]}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 4, "total_tokens": 16,
                      "output_tokens_details": {"reasoning_tokens": 0}}
        }"#;
        let envelope: ResponsesEnvelope = serde_json::from_str(raw).unwrap();
        let response = envelope.into_response();

        assert_eq!(response.text, "{\"contacts\": []}");
        assert_eq!(response.status, "completed");
        assert_eq!(response.usage.total_tokens, 16);
        assert!(response.incomplete_reason.is_none());
    }

    #[test]
    fn test_decode_skips_incomplete_items() {
        let raw = r#"{
            "status": "incomplete",
            "incomplete_details": {"reason": "max_output_tokens"},
            "output": [
                {"type": "message", "status": "incomplete", "content": [
                    {"type": "output_text", "text": "{\"contacts\": ["}
                ]}
            ]
        }"#;
        let envelope: ResponsesEnvelope = serde_json::from_str(raw).unwrap();
        let response = envelope.into_response();

        assert!(response.text.is_empty());
        assert_eq!(response.incomplete_reason.as_deref(), Some("max_output_tokens"));
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(serde_json::from_str::<ResponsesEnvelope>(r#"{"choices": []}"#).is_err());
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
        assert_eq!(api_error_message(body), "Rate limit reached");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
    }

    #[test]
    fn test_unconfigured_without_key() {
        let service = OpenAiService::new(Client::new(), None, "gpt-5-mini");
        assert!(!service.is_configured());
        let service = OpenAiService::new(Client::new(), Some("  ".into()), "gpt-5-mini");
        assert!(!service.is_configured());
    }
}
