//! Admin panel backend: user/role management and application settings.

mod handlers;
mod service;

pub use handlers::*;
pub use service::*;

use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("User not found")]
    UserNotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseConnection | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_error_display() {
        assert_eq!(AdminError::UserNotFound.to_string(), "User not found");
    }

    #[test]
    fn test_role_validation() {
        assert!(validate_role("user").is_ok());
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("root").is_err());
        assert!(validate_super_role(None).is_ok());
        assert!(validate_super_role(Some("superadmin")).is_ok());
        assert!(validate_super_role(Some("god")).is_err());
    }
}
