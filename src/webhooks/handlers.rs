use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::scoring::ScoringRequest;
use super::WebhooksError;
use crate::auth::AuthenticatedUser;
use crate::clients::has_client_access;
use crate::customers::{Customer, CustomerRow, ScoringStatus};
use crate::shared::models::client_customers;
use crate::shared::state::AppState;

pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "customerId")]
    pub customer_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Generated,
    Failed,
}

#[derive(Debug, Deserialize)]
pub struct ScoreWebhookPayload {
    pub status: WebhookOutcome,
    pub score: Option<i32>,
    pub summary: Option<String>,
    pub error: Option<String>,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/customers/:id/generate", post(trigger_generation))
        .route("/api/webhooks/score", post(receive_score))
}

/// Submit a customer to the external scoring API and mark the row
/// `processing`. A second trigger while one is in flight is rejected so a
/// late webhook cannot be attributed to the wrong run.
pub async fn trigger_generation(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Customer>, WebhooksError> {
    let row = {
        let mut conn = state.conn.get().map_err(|_| WebhooksError::DatabaseConnection)?;
        let row: Option<CustomerRow> = client_customers::table
            .find(customer_id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| WebhooksError::Database(e.to_string()))?;
        let row = row.ok_or(WebhooksError::CustomerNotFound)?;

        if !has_client_access(&mut conn, row.client_id, &user)
            .map_err(|e| WebhooksError::Database(e.to_string()))?
        {
            return Err(WebhooksError::Forbidden);
        }
        row
    };

    if !row.scoring_status().accepts_generation_trigger() {
        return Err(WebhooksError::AlreadyProcessing);
    }

    let callback_url = format!(
        "{}/api/webhooks/score?customerId={}",
        state.config.server.public_url.trim_end_matches('/'),
        customer_id
    );
    state
        .scoring
        .submit(&ScoringRequest {
            customer_id,
            name: row.name.clone(),
            email: row.email.clone(),
            company: row.company.clone(),
            callback_url,
        })
        .await?;

    let mut conn = state.conn.get().map_err(|_| WebhooksError::DatabaseConnection)?;
    let updated: CustomerRow = diesel::update(client_customers::table.find(customer_id))
        .set((
            client_customers::scoring_status.eq(ScoringStatus::Processing.to_string()),
            client_customers::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|e| WebhooksError::Database(e.to_string()))?;

    info!("customer {customer_id} submitted for scoring");
    Ok(Json(Customer::from(updated)))
}

/// Webhook receiver for scoring results. Only rows currently `processing`
/// accept a result; anything else is rejected without mutation.
pub async fn receive_score(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    Json(payload): Json<ScoreWebhookPayload>,
) -> Result<Json<serde_json::Value>, WebhooksError> {
    let presented = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented != state.config.webhook.token {
        warn!("webhook rejected: bad token for customer {}", query.customer_id);
        return Err(WebhooksError::Unauthorized);
    }

    let mut conn = state.conn.get().map_err(|_| WebhooksError::DatabaseConnection)?;

    let row: Option<CustomerRow> = client_customers::table
        .find(query.customer_id)
        .select(CustomerRow::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| WebhooksError::Database(e.to_string()))?;
    let row = row.ok_or(WebhooksError::CustomerNotFound)?;

    let current = row.scoring_status();
    if !current.accepts_webhook_result() {
        return Err(WebhooksError::NotProcessing(current.to_string()));
    }

    let (status, score, summary) = match payload.status {
        WebhookOutcome::Generated => (
            ScoringStatus::Generated,
            payload.score,
            payload.summary,
        ),
        WebhookOutcome::Failed => (
            ScoringStatus::Failed,
            None,
            payload.error.or(payload.summary),
        ),
    };

    diesel::update(client_customers::table.find(query.customer_id))
        .set((
            client_customers::scoring_status.eq(status.to_string()),
            client_customers::score.eq(score),
            client_customers::score_summary.eq(summary),
            client_customers::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .map_err(|e| WebhooksError::Database(e.to_string()))?;

    info!("customer {} moved to {status}", query.customer_id);
    Ok(Json(serde_json::json!({ "success": true })))
}
