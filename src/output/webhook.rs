//! Webhook delivery
//!
//! Posts the final contact list as JSON. Delivery problems are reported in a
//! [`DeliveryReport`] and never fail the run.

use crate::config::WebhookConfig;
use crate::contact::Contact;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Outcome of one webhook delivery
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeliveryReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct Payload<'a, M: Serialize> {
    contacts: &'a [Contact],
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<&'a M>,
    generated_at: String,
}

#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// Client for the configured webhook, if one is set
    pub fn from_config(client: Client, config: &WebhookConfig) -> Option<Self> {
        let url = config.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(Self::new(
            client,
            url,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts `{contacts, job?, generated_at}` to the webhook
    pub async fn deliver<M: Serialize>(&self, contacts: &[Contact], job: Option<&M>) -> DeliveryReport {
        let payload = Payload {
            contacts,
            job,
            generated_at: chrono::Utc::now().to_rfc3339(),
        };

        tracing::debug!("Delivering {} contacts to {}", contacts.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    tracing::info!("Webhook accepted {} contacts ({})", contacts.len(), status);
                    DeliveryReport {
                        success: true,
                        status: Some(status.as_u16()),
                        error: None,
                    }
                } else {
                    tracing::warn!("Webhook rejected delivery: {}", status);
                    DeliveryReport {
                        success: false,
                        status: Some(status.as_u16()),
                        error: Some(format!("webhook responded with {}", status)),
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Webhook delivery failed: {}", e);
                DeliveryReport {
                    success: false,
                    status: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_url() {
        let mut config = WebhookConfig::default();
        config.url = None;
        assert!(WebhookClient::from_config(Client::new(), &config).is_none());

        config.url = Some("  ".into());
        assert!(WebhookClient::from_config(Client::new(), &config).is_none());

        config.url = Some("https://hooks.example.com/in".into());
        let hook = WebhookClient::from_config(Client::new(), &config).unwrap();
        assert_eq!(hook.url(), "https://hooks.example.com/in");
    }
}
