//! Integration tests for webhook delivery

use contact_harvest::output::WebhookClient;
use contact_harvest::Contact;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn contacts() -> Vec<Contact> {
    let mut press = Contact::email("press@example.com", "Press", "https://example.com/");
    press.validated = Some(true);
    vec![
        press,
        Contact::phone("+14155550123", "Call us", "https://example.com/contact"),
    ]
}

#[tokio::test]
async fn test_delivery_posts_contacts_and_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let hook = WebhookClient::new(
        Client::new(),
        format!("{}/hook", mock_server.uri()),
        Duration::from_secs(5),
    );
    let metadata = json!({"id": "job-1", "status": "OK"});
    let report = hook.deliver(&contacts(), Some(&metadata)).await;

    assert!(report.success);
    assert_eq!(report.status, Some(202));
    assert!(report.error.is_none());

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["contacts"].as_array().unwrap().len(), 2);
    assert_eq!(body["contacts"][0]["value"], "press@example.com");
    assert_eq!(body["contacts"][0]["validated"], true);
    assert_eq!(body["job"]["id"], "job-1");
    assert!(body["generated_at"].is_string());
}

#[tokio::test]
async fn test_delivery_without_metadata_omits_job() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let hook = WebhookClient::new(
        Client::new(),
        format!("{}/hook", mock_server.uri()),
        Duration::from_secs(5),
    );
    let report = hook.deliver::<Value>(&contacts(), None).await;
    assert!(report.success);

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("job").is_none());
}

#[tokio::test]
async fn test_rejected_delivery_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let hook = WebhookClient::new(
        Client::new(),
        format!("{}/hook", mock_server.uri()),
        Duration::from_secs(5),
    );
    let report = hook.deliver::<Value>(&contacts(), None).await;

    assert!(!report.success);
    assert_eq!(report.status, Some(500));
    assert!(report.error.unwrap().contains("500"));
}

#[tokio::test]
async fn test_unreachable_webhook_is_reported() {
    // nothing listens on the discard port
    let hook = WebhookClient::new(
        Client::new(),
        "http://127.0.0.1:9/hook",
        Duration::from_secs(2),
    );
    let report = hook.deliver::<Value>(&contacts(), None).await;

    assert!(!report.success);
    assert!(report.status.is_none());
    assert!(report.error.is_some());
}
