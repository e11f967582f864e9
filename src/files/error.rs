use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Lead not found")]
    LeadNotFound,
    #[error("You do not have access to this client")]
    Forbidden,
    #[error("No file provided")]
    MissingFile,
    #[error("File exceeds the {} MB size limit", .0 / (1024 * 1024))]
    TooLarge(i64),
    #[error("Document upload failed")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for FilesError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, details) = match &self {
            Self::LeadNotFound => (StatusCode::NOT_FOUND, None),
            Self::Forbidden => (StatusCode::FORBIDDEN, None),
            Self::MissingFile | Self::TooLarge(_) | Self::Validation(_) => {
                (StatusCode::BAD_REQUEST, None)
            }
            Self::Storage(details) => (StatusCode::BAD_GATEWAY, Some(details.clone())),
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
