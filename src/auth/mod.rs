//! Session layer: argon2-hashed credentials, JWT claims, cookie/bearer
//! extraction and the `AuthenticatedUser` extractor used by every
//! protected route.

pub mod error;
pub mod handlers;
pub mod service;

pub use error::AuthError;
pub use handlers::configure;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts, HeaderMap, StatusCode};
use axum::RequestPartsExt;
use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::security::{ROLE_ADMIN, SUPER_ROLE_SUPERADMIN};
use crate::shared::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// JWT claims carried by every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub super_role: Option<String>,
    pub session_id: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!(
                "JWT_SECRET not set, using default development secret - DO NOT USE IN PRODUCTION"
            );
            "dev-secret-key-change-in-production-minimum-32-chars".to_string()
        });
        Self {
            jwt_secret,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
        }
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|auth| {
            if auth.to_lowercase().starts_with("bearer ") {
                Some(auth[7..].to_string())
            } else {
                None
            }
        })
}

pub fn create_auth_cookie(token: &str, expiry_hours: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(tower_cookies::cookie::time::Duration::hours(expiry_hours));
    cookie
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.claims.sub)
            .map_err(|_| AuthError::Token("malformed subject claim".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.claims.role == ROLE_ADMIN
            || self.claims.super_role.as_deref() == Some(SUPER_ROLE_SUPERADMIN)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);

        let token = if let Some(bearer_token) = extract_bearer_token(&parts.headers) {
            bearer_token
        } else if let Ok(cookies) = parts.extract::<Cookies>().await {
            cookies
                .get(AUTH_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or((StatusCode::UNAUTHORIZED, "No authentication token"))?
        } else {
            return Err((StatusCode::UNAUTHORIZED, "No authentication token"));
        };

        let claims = decode::<Claims>(&token, &state.auth.decoding_key(), &Validation::default())
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token"))?
            .claims;

        if claims.exp < Utc::now().timestamp() {
            return Err((StatusCode::UNAUTHORIZED, "Token expired"));
        }

        Ok(AuthenticatedUser { claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_extraction_case_insensitive() {
        let headers = headers_with_auth("BEARER abc123");
        assert_eq!(extract_bearer_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_bearer_extraction_rejects_other_schemes() {
        let headers = headers_with_auth("Basic abc123");
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn test_is_admin_via_role_or_super_role() {
        let mut claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.c".to_string(),
            name: "a".to_string(),
            role: "user".to_string(),
            super_role: None,
            session_id: Uuid::new_v4().to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        assert!(!AuthenticatedUser { claims: claims.clone() }.is_admin());

        claims.role = "admin".to_string();
        assert!(AuthenticatedUser { claims: claims.clone() }.is_admin());

        claims.role = "user".to_string();
        claims.super_role = Some("superadmin".to_string());
        assert!(AuthenticatedUser { claims }.is_admin());
    }
}
