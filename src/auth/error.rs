use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Database error: {0}")]
    Database(String),
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is deactivated")]
    Deactivated,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Token error: {0}")]
    Token(String),
    #[error("Profile not found")]
    NotFound,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::EmailTaken | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Deactivated | Self::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound => StatusCode::NOT_FOUND,
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
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::EmailTaken.to_string(),
            "An account with this email already exists"
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
