use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum LeadsError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Lead not found")]
    NotFound,
    #[error("You do not have access to this client")]
    Forbidden,
    #[error("A lead with email {0} already exists for this client")]
    DuplicateEmail(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for LeadsError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::DuplicateEmail(_) => StatusCode::CONFLICT,
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
