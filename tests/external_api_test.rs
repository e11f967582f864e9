//! The external-API clients (document upload, email generation, scoring)
//! against mockito doubles.

use crmserver::config::{GenerationConfig, ScoringConfig, StorageConfig};
use crmserver::email::generator::EmailGenerator;
use crmserver::files::storage::DocumentClient;
use crmserver::webhooks::scoring::{ScoringClient, ScoringRequest};
use uuid::Uuid;

fn storage_config(url: &str) -> StorageConfig {
    StorageConfig {
        api_url: url.to_string(),
        api_token: "doc-token".to_string(),
        max_file_size: 50 * 1024 * 1024,
    }
}

#[tokio::test]
async fn test_document_upload_returns_stored_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/documents")
        .match_header("authorization", "Bearer doc-token")
        .with_status(200)
        .with_body(r#"{"url": "https://docs.example.com/abc.pdf"}"#)
        .create_async()
        .await;

    let client = DocumentClient::new(&storage_config(&server.url()));
    let stored = client
        .upload("abc.pdf", Some("application/pdf"), b"%PDF-1.4".to_vec())
        .await
        .unwrap();

    assert_eq!(stored.url, "https://docs.example.com/abc.pdf");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_document_upload_accepts_nested_envelope() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/documents")
        .with_status(200)
        .with_body(r#"{"file": {"url": "https://docs.example.com/x"}}"#)
        .create_async()
        .await;

    let client = DocumentClient::new(&storage_config(&server.url()));
    let stored = client.upload("x.txt", None, b"hi".to_vec()).await.unwrap();
    assert_eq!(stored.url, "https://docs.example.com/x");
}

#[tokio::test]
async fn test_document_upload_surfaces_upstream_error_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/documents")
        .with_status(507)
        .with_body(r#"{"error": {"message": "storage quota exhausted"}}"#)
        .create_async()
        .await;

    let client = DocumentClient::new(&storage_config(&server.url()));
    let err = client.upload("x.txt", None, b"hi".to_vec()).await.unwrap_err();
    match err {
        crmserver::files::FilesError::Storage(details) => {
            assert!(details.contains("storage quota exhausted"), "got: {details}");
        }
        other => panic!("expected Storage error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_email_generation_parses_json_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .match_header("x-api-key", "gen-key")
        .with_status(200)
        .with_body(
            r#"{"content": [{"type": "text", "text": "{\"subject\": \"Quarterly sync\", \"body\": \"Hi Ada,\"}"}]}"#,
        )
        .create_async()
        .await;

    let generator = EmailGenerator::new(&GenerationConfig {
        api_url: server.url(),
        api_key: "gen-key".to_string(),
        model: "claude-3-sonnet-20240229".to_string(),
    });
    let email = generator.generate("write an email").await.unwrap();

    assert_eq!(email.subject, "Quarterly sync");
    assert_eq!(email.body, "Hi Ada,");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_email_generation_error_is_extracted_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/messages")
        .with_status(429)
        .with_body(r#"{"error": {"message": "rate limit reached"}}"#)
        .create_async()
        .await;

    let generator = EmailGenerator::new(&GenerationConfig {
        api_url: server.url(),
        api_key: String::new(),
        model: "m".to_string(),
    });
    let err = generator.generate("prompt").await.unwrap_err();
    match err {
        crmserver::email::EmailError::Generation(details) => {
            assert!(details.contains("rate limit reached"), "got: {details}");
        }
        other => panic!("expected Generation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_scoring_submit_posts_callback_url() {
    let mut server = mockito::Server::new_async().await;
    let callback_url =
        "http://localhost:8080/api/webhooks/score?customerId=00000000-0000-0000-0000-000000000000";
    let mock = server
        .mock("POST", "/score")
        .match_header("authorization", "Bearer score-key")
        .match_body(mockito::Matcher::PartialJsonString(format!(
            r#"{{"name": "ACME", "callback_url": "{callback_url}"}}"#
        )))
        .with_status(202)
        .with_body(r#"{"accepted": true}"#)
        .create_async()
        .await;

    let client = ScoringClient::new(&ScoringConfig {
        api_url: server.url(),
        api_key: "score-key".to_string(),
    });
    let request = ScoringRequest {
        customer_id: Uuid::nil(),
        name: "ACME".to_string(),
        email: None,
        company: None,
        callback_url: callback_url.to_string(),
    };
    client.submit(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_scoring_submit_failure_carries_details() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/score")
        .with_status(503)
        .with_body("scoring backend down")
        .create_async()
        .await;

    let client = ScoringClient::new(&ScoringConfig {
        api_url: server.url(),
        api_key: String::new(),
    });
    let request = ScoringRequest {
        customer_id: Uuid::new_v4(),
        name: "ACME".to_string(),
        email: Some("ops@acme.test".to_string()),
        company: Some("ACME".to_string()),
        callback_url: "http://localhost/api/webhooks/score".to_string(),
    };
    let err = client.submit(&request).await.unwrap_err();
    match err {
        crmserver::webhooks::WebhooksError::Scoring(details) => {
            assert!(details.contains("scoring backend down"), "got: {details}");
        }
        other => panic!("expected Scoring error, got {other:?}"),
    }
}
