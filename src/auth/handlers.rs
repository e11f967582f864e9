use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::{Cookie, Cookies};
use tracing::info;

use super::error::AuthError;
use super::service::{issue_token, AuthService, ProfileRow};
use super::{create_auth_cookie, AuthenticatedUser, AUTH_COOKIE};
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Serialize, Clone)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub super_role: Option<String>,
}

impl From<&ProfileRow> for UserInfo {
    fn from(profile: &ProfileRow) -> Self {
        Self {
            id: profile.id.to_string(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            role: profile.role.clone(),
            super_role: profile.super_role.clone(),
        }
    }
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(AuthError::Validation("a valid email is required".to_string()));
    }
    if request.password.len() < 8 {
        return Err(AuthError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if request.display_name.trim().is_empty() {
        return Err(AuthError::Validation("display name is required".to_string()));
    }

    let service = AuthService::new(state.conn.clone());
    let profile = service
        .signup(&request.email, &request.password, request.display_name.trim())
        .await?;
    info!("created profile {} ({})", profile.id, profile.email);

    let (token, _claims) = issue_token(&profile, &state.auth)?;
    cookies.add(create_auth_cookie(&token, state.auth.jwt_expiry_hours));

    Ok(Json(SessionResponse {
        token,
        user: UserInfo::from(&profile),
    }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    let service = AuthService::new(state.conn.clone());
    let profile = service.verify_login(&request.email, &request.password).await?;

    let (token, _claims) = issue_token(&profile, &state.auth)?;
    cookies.add(create_auth_cookie(&token, state.auth.jwt_expiry_hours));

    Ok(Json(SessionResponse {
        token,
        user: UserInfo::from(&profile),
    }))
}

pub async fn logout(cookies: Cookies, user: AuthenticatedUser) -> Json<serde_json::Value> {
    info!("user {} logging out", user.claims.email);
    cookies.remove(Cookie::new(AUTH_COOKIE, ""));
    Json(serde_json::json!({ "success": true }))
}

/// Session restore: resolves the token back to the live profile row so a
/// stale token for a deleted or deactivated account cannot keep a session.
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<UserInfo>, AuthError> {
    let service = AuthService::new(state.conn.clone());
    let profile = service
        .find_profile(user.user_id()?)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    if !profile.is_active {
        return Err(AuthError::Deactivated);
    }
    Ok(Json(UserInfo::from(&profile)))
}
