//! Customer scoring: the generation trigger that submits a customer to the
//! external scoring API and the webhook receiver that lands the result.

mod handlers;
pub mod scoring;

pub use handlers::*;
pub use scoring::ScoringClient;

use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum WebhooksError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Customer not found")]
    CustomerNotFound,
    #[error("You do not have access to this client")]
    Forbidden,
    #[error("Invalid webhook token")]
    Unauthorized,
    #[error("Customer is not awaiting a scoring result")]
    NotProcessing(String),
    #[error("A scoring run is already in progress for this customer")]
    AlreadyProcessing,
    #[error("Scoring request failed")]
    Scoring(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for WebhooksError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, details) = match &self {
            Self::CustomerNotFound => (StatusCode::NOT_FOUND, None),
            Self::Forbidden => (StatusCode::FORBIDDEN, None),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            Self::NotProcessing(current) => (
                StatusCode::BAD_REQUEST,
                Some(format!("current status is {current}")),
            ),
            Self::AlreadyProcessing => (StatusCode::CONFLICT, None),
            Self::Scoring(details) => (StatusCode::BAD_GATEWAY, Some(details.clone())),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, None),
            Self::DatabaseConnection | Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };
        let mut body = serde_json::json!({ "error": self.to_string() });
        if let Some(details) = details {
            body["details"] = serde_json::Value::String(details);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhooks_error_display() {
        assert_eq!(
            WebhooksError::NotProcessing("generated".to_string()).to_string(),
            "Customer is not awaiting a scoring result"
        );
        assert_eq!(
            WebhooksError::AlreadyProcessing.to_string(),
            "A scoring run is already in progress for this customer"
        );
    }
}
