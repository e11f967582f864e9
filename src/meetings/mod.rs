//! Scheduled meetings for a client.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::clients::has_client_access;
use crate::shared::models::client_meetings;
use crate::shared::state::AppState;
use crate::shared::utils::DbPool;

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = client_meetings)]
pub struct Meeting {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub agenda: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub location: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = client_meetings)]
struct NewMeetingRow<'a> {
    id: Uuid,
    client_id: Uuid,
    title: &'a str,
    agenda: Option<&'a str>,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    location: Option<&'a str>,
    created_by: Uuid,
}

#[derive(AsChangeset)]
#[diesel(table_name = client_meetings)]
struct MeetingChanges<'a> {
    title: Option<&'a str>,
    agenda: Option<&'a str>,
    scheduled_at: Option<DateTime<Utc>>,
    duration_minutes: Option<i32>,
    location: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    pub agenda: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeetingRequest {
    pub title: Option<String>,
    pub agenda: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MeetingsError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Meeting not found")]
    NotFound,
    #[error("You do not have access to this client")]
    Forbidden,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl axum::response::IntoResponse for MeetingsError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
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

pub struct MeetingsService {
    pool: DbPool,
}

impl MeetingsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_meetings(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<Meeting>, MeetingsError> {
        let mut conn = self.pool.get().map_err(|_| MeetingsError::DatabaseConnection)?;
        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| MeetingsError::Database(e.to_string()))?
        {
            return Err(MeetingsError::Forbidden);
        }

        client_meetings::table
            .filter(client_meetings::client_id.eq(client_id))
            .select(Meeting::as_select())
            .order(client_meetings::scheduled_at.asc())
            .load(&mut conn)
            .map_err(|e| MeetingsError::Database(e.to_string()))
    }

    pub async fn create_meeting(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
        request: CreateMeetingRequest,
    ) -> Result<Meeting, MeetingsError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(MeetingsError::Validation("meeting title is required".to_string()));
        }
        let duration = request.duration_minutes.unwrap_or(30);
        if duration <= 0 {
            return Err(MeetingsError::Validation(
                "duration must be positive".to_string(),
            ));
        }

        let mut conn = self.pool.get().map_err(|_| MeetingsError::DatabaseConnection)?;
        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| MeetingsError::Database(e.to_string()))?
        {
            return Err(MeetingsError::Forbidden);
        }

        let created_by = user.user_id().map_err(|_| MeetingsError::Forbidden)?;
        diesel::insert_into(client_meetings::table)
            .values(&NewMeetingRow {
                id: Uuid::new_v4(),
                client_id,
                title,
                agenda: request.agenda.as_deref(),
                scheduled_at: request.scheduled_at,
                duration_minutes: duration,
                location: request.location.as_deref(),
                created_by,
            })
            .get_result::<Meeting>(&mut conn)
            .map_err(|e| MeetingsError::Database(e.to_string()))
    }

    pub async fn update_meeting(
        &self,
        meeting_id: Uuid,
        user: &AuthenticatedUser,
        request: UpdateMeetingRequest,
    ) -> Result<Meeting, MeetingsError> {
        if let Some(duration) = request.duration_minutes {
            if duration <= 0 {
                return Err(MeetingsError::Validation(
                    "duration must be positive".to_string(),
                ));
            }
        }

        let mut conn = self.pool.get().map_err(|_| MeetingsError::DatabaseConnection)?;

        let client_id: Option<Uuid> = client_meetings::table
            .find(meeting_id)
            .select(client_meetings::client_id)
            .first(&mut conn)
            .optional()
            .map_err(|e| MeetingsError::Database(e.to_string()))?;
        let client_id = client_id.ok_or(MeetingsError::NotFound)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| MeetingsError::Database(e.to_string()))?
        {
            return Err(MeetingsError::Forbidden);
        }

        diesel::update(client_meetings::table.find(meeting_id))
            .set(&MeetingChanges {
                title: request.title.as_deref(),
                agenda: request.agenda.as_deref(),
                scheduled_at: request.scheduled_at,
                duration_minutes: request.duration_minutes,
                location: request.location.as_deref(),
                updated_at: Utc::now(),
            })
            .get_result::<Meeting>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => MeetingsError::NotFound,
                other => MeetingsError::Database(other.to_string()),
            })
    }
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/clients/:id/meetings", get(list_meetings))
        .route("/api/clients/:id/meetings", post(create_meeting))
        .route("/api/meetings/:id", put(update_meeting))
}

pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Meeting>>, MeetingsError> {
    let service = MeetingsService::new(state.conn.clone());
    Ok(Json(service.list_meetings(client_id, &user).await?))
}

pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<CreateMeetingRequest>,
) -> Result<Json<Meeting>, MeetingsError> {
    let service = MeetingsService::new(state.conn.clone());
    Ok(Json(service.create_meeting(client_id, &user, request).await?))
}

pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateMeetingRequest>,
) -> Result<Json<Meeting>, MeetingsError> {
    let service = MeetingsService::new(state.conn.clone());
    Ok(Json(service.update_meeting(meeting_id, &user, request).await?))
}
