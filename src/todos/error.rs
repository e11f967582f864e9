use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum TodosError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Todo not found")]
    NotFound,
    #[error("Lead not found")]
    LeadNotFound,
    #[error("Template not found or not a todo checklist")]
    TemplateNotFound,
    #[error("You do not have access to this client")]
    Forbidden,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for TodosError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::NotFound | Self::LeadNotFound | Self::TemplateNotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
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
