//! Templated email generation through the external text-generation API.

pub mod generator;
mod handlers;

pub use generator::{EmailGenerator, GeneratedEmail};
pub use handlers::*;

use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Email generation failed")]
    Generation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for EmailError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, details) = match &self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, None),
            Self::Generation(details) => (StatusCode::BAD_GATEWAY, Some(details.clone())),
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
    fn test_generation_error_hides_details_from_display() {
        let err = EmailError::Generation("model overloaded".to_string());
        assert_eq!(err.to_string(), "Email generation failed");
    }
}
