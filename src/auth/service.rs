use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use jsonwebtoken::{encode, Header};
use tracing::error;
use uuid::Uuid;

use super::error::AuthError;
use super::{AuthConfig, Claims};
use crate::security::{ROLE_ADMIN, ROLE_USER, SUPER_ROLE_SUPERADMIN};
use crate::shared::models::profiles;
use crate::shared::utils::DbPool;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub super_role: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = profiles)]
struct NewProfile<'a> {
    id: Uuid,
    email: &'a str,
    display_name: &'a str,
    password_hash: &'a str,
    role: &'a str,
    super_role: Option<&'a str>,
    is_active: bool,
}

pub struct AuthService {
    pool: DbPool,
}

impl AuthService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<ProfileRow, AuthError> {
        let email = email.trim().to_lowercase();
        let mut conn = self.pool.get().map_err(|_| AuthError::DatabaseConnection)?;

        let existing: i64 = profiles::table
            .filter(profiles::email.eq(&email))
            .count()
            .get_result(&mut conn)
            .map_err(|e| {
                error!("failed to check for existing profile: {e}");
                AuthError::Database(e.to_string())
            })?;
        if existing > 0 {
            return Err(AuthError::EmailTaken);
        }

        // The first profile ever created becomes the superadmin so a fresh
        // deployment has someone who can reach the admin panel.
        let total: i64 = profiles::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| AuthError::Database(e.to_string()))?;
        let (role, super_role) = if total == 0 {
            (ROLE_ADMIN, Some(SUPER_ROLE_SUPERADMIN))
        } else {
            (ROLE_USER, None)
        };

        let password_hash = hash_password(password)?;
        let row = NewProfile {
            id: Uuid::new_v4(),
            email: &email,
            display_name,
            password_hash: &password_hash,
            role,
            super_role,
            is_active: true,
        };

        diesel::insert_into(profiles::table)
            .values(&row)
            .get_result::<ProfileRow>(&mut conn)
            .map_err(|e| {
                error!("failed to create profile: {e}");
                AuthError::Database(e.to_string())
            })
    }

    pub async fn verify_login(&self, email: &str, password: &str) -> Result<ProfileRow, AuthError> {
        let email = email.trim().to_lowercase();
        let mut conn = self.pool.get().map_err(|_| AuthError::DatabaseConnection)?;

        let profile: Option<ProfileRow> = profiles::table
            .filter(profiles::email.eq(&email))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AuthError::Database(e.to_string()))?;

        let profile = profile.ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &profile.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        if !profile.is_active {
            return Err(AuthError::Deactivated);
        }
        Ok(profile)
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AuthError> {
        let mut conn = self.pool.get().map_err(|_| AuthError::DatabaseConnection)?;
        profiles::table
            .find(user_id)
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AuthError::Database(e.to_string()))
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Database(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn issue_token(profile: &ProfileRow, config: &AuthConfig) -> Result<(String, Claims), AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: profile.id.to_string(),
        email: profile.email.clone(),
        name: profile.display_name.clone(),
        role: profile.role.clone(),
        super_role: profile.super_role.clone(),
        session_id: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.jwt_expiry_hours)).timestamp(),
    };
    let token = encode(&Header::default(), &claims, &config.encoding_key())
        .map_err(|e| AuthError::Token(e.to_string()))?;
    Ok((token, claims))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_issue_token_roundtrips_claims() {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
        };
        let profile = ProfileRow {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            display_name: "User".to_string(),
            password_hash: String::new(),
            role: "user".to_string(),
            super_role: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let (token, claims) = issue_token(&profile, &config).unwrap();
        let decoded = jsonwebtoken::decode::<Claims>(
            &token,
            &config.decoding_key(),
            &jsonwebtoken::Validation::default(),
        )
        .unwrap()
        .claims;
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, "user@example.com");
        assert!(decoded.exp > decoded.iat);
    }
}
