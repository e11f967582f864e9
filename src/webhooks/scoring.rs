use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use super::WebhooksError;
use crate::config::ScoringConfig;
use crate::shared::utils::extract_api_error;

/// Payload submitted to the external scoring API. The callback URL points
/// back at our webhook receiver for this customer.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringRequest {
    pub customer_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub callback_url: String,
}

#[derive(Clone)]
pub struct ScoringClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ScoringClient {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Fire the scoring run. The result arrives later through the webhook;
    /// a 2xx here only means the run was accepted.
    pub async fn submit(&self, request: &ScoringRequest) -> Result<(), WebhooksError> {
        let response = self
            .client
            .post(format!("{}/score", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("scoring API request failed: {e}");
                WebhooksError::Scoring(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let details = extract_api_error(response).await;
            return Err(WebhooksError::Scoring(format!("{status}: {details}")));
        }
        Ok(())
    }
}
