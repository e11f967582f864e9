use reqwest::multipart;
use serde::Deserialize;
use tracing::error;

use super::error::FilesError;
use crate::config::StorageConfig;
use crate::shared::utils::extract_api_error;

/// Where the document API parked the file.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredDocument {
    pub url: String,
}

/// Thin client for the external document-hosting API. Files are forwarded
/// as multipart with a bearer credential and the returned URL is what gets
/// persisted - the bytes never live on this server.
#[derive(Clone)]
pub struct DocumentClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl DocumentClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    pub async fn upload(
        &self,
        file_name: &str,
        mime_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<StoredDocument, FilesError> {
        let mut part = multipart::Part::bytes(data).file_name(file_name.to_string());
        if let Some(mime) = mime_type {
            part = part
                .mime_str(mime)
                .map_err(|e| FilesError::Validation(format!("invalid mime type: {e}")))?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/documents", self.base_url))
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("document API request failed: {e}");
                FilesError::Storage(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let details = extract_api_error(response).await;
            return Err(FilesError::Storage(format!("{status}: {details}")));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FilesError::Storage(format!("malformed response: {e}")))?;

        // The API has answered with both {"url": ...} and
        // {"file": {"url": ...}} envelopes over time.
        let url = value
            .get("url")
            .or_else(|| value.pointer("/file/url"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| FilesError::Storage("response missing document url".to_string()))?;

        Ok(StoredDocument {
            url: url.to_string(),
        })
    }
}
