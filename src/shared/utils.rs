use anyhow::{Context, Result};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

use crate::config::DatabaseConfig;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn(config: &DatabaseConfig) -> Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(&config.url);
    Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
        .context("failed to build connection pool")
}

/// Best-effort extraction of a human-readable message from a failing
/// external API response. The upstream services disagree on shape, so try
/// the common envelopes before falling back to the raw body.
pub async fn extract_api_error(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        return "no response body".to_string();
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        for candidate in [
            value.pointer("/error/message"),
            value.get("error"),
            value.get("message"),
            value.get("details"),
        ]
        .into_iter()
        .flatten()
        {
            if let Some(text) = candidate.as_str() {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_with_body(body: &'static str) -> reqwest::Response {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(500)
            .with_body(body)
            .create_async()
            .await;
        reqwest::get(server.url()).await.unwrap()
    }

    #[tokio::test]
    async fn test_extract_nested_error_message() {
        let response = response_with_body(r#"{"error":{"message":"quota exceeded"}}"#).await;
        assert_eq!(extract_api_error(response).await, "quota exceeded");
    }

    #[tokio::test]
    async fn test_extract_flat_error_string() {
        let response = response_with_body(r#"{"error":"bad file"}"#).await;
        assert_eq!(extract_api_error(response).await, "bad file");
    }

    #[tokio::test]
    async fn test_extract_falls_back_to_raw_body() {
        let response = response_with_body("upstream exploded").await;
        assert_eq!(extract_api_error(response).await, "upstream exploded");
    }
}
