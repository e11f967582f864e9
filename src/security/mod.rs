mod cors;

pub use cors::{create_cors_layer, CorsConfig};

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::auth::AuthenticatedUser;
use crate::shared::state::AppState;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";
pub const SUPER_ROLE_SUPERADMIN: &str = "superadmin";

/// Extractor for role-gated admin routes. Rejects non-admin callers with
/// 403 instead of the UI-era redirect to `/`.
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state)
            .await
            .map_err(|(status, message)| {
                (status, Json(serde_json::json!({ "error": message })))
            })?;
        if !user.is_admin() {
            return Err((
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": "Admin access required" })),
            ));
        }
        Ok(AdminUser(user))
    }
}

/// Extractor for superadmin-only routes (role administration).
pub struct SuperAdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for SuperAdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AdminUser(user) = AdminUser::from_request_parts(parts, state).await?;
        if user.claims.super_role.as_deref() != Some(SUPER_ROLE_SUPERADMIN) {
            return Err((
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": "Superadmin access required" })),
            ));
        }
        Ok(SuperAdminUser(user))
    }
}
