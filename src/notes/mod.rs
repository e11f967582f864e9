//! Free-form notes attached to a client, with pinning.

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
use crate::shared::models::client_notes;
use crate::shared::state::AppState;
use crate::shared::utils::DbPool;

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = client_notes)]
pub struct Note {
    pub id: Uuid,
    pub client_id: Uuid,
    pub author_id: Uuid,
    pub title: Option<String>,
    pub body: String,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = client_notes)]
struct NewNoteRow<'a> {
    id: Uuid,
    client_id: Uuid,
    author_id: Uuid,
    title: Option<&'a str>,
    body: &'a str,
    pinned: bool,
}

#[derive(AsChangeset)]
#[diesel(table_name = client_notes)]
struct NoteChanges<'a> {
    title: Option<&'a str>,
    body: Option<&'a str>,
    pinned: Option<bool>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub body: String,
    pub pinned: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub pinned: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotesError {
    #[error("Database connection failed")]
    DatabaseConnection,
    #[error("Note not found")]
    NotFound,
    #[error("You do not have access to this client")]
    Forbidden,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl axum::response::IntoResponse for NotesError {
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

pub struct NotesService {
    pool: DbPool,
}

impl NotesService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_notes(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Vec<Note>, NotesError> {
        let mut conn = self.pool.get().map_err(|_| NotesError::DatabaseConnection)?;
        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| NotesError::Database(e.to_string()))?
        {
            return Err(NotesError::Forbidden);
        }

        client_notes::table
            .filter(client_notes::client_id.eq(client_id))
            .select(Note::as_select())
            .order((client_notes::pinned.desc(), client_notes::created_at.desc()))
            .load(&mut conn)
            .map_err(|e| NotesError::Database(e.to_string()))
    }

    pub async fn create_note(
        &self,
        client_id: Uuid,
        user: &AuthenticatedUser,
        request: CreateNoteRequest,
    ) -> Result<Note, NotesError> {
        let body = request.body.trim();
        if body.is_empty() {
            return Err(NotesError::Validation("note body is required".to_string()));
        }

        let mut conn = self.pool.get().map_err(|_| NotesError::DatabaseConnection)?;
        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| NotesError::Database(e.to_string()))?
        {
            return Err(NotesError::Forbidden);
        }

        let author_id = user.user_id().map_err(|_| NotesError::Forbidden)?;
        diesel::insert_into(client_notes::table)
            .values(&NewNoteRow {
                id: Uuid::new_v4(),
                client_id,
                author_id,
                title: request.title.as_deref(),
                body,
                pinned: request.pinned.unwrap_or(false),
            })
            .get_result::<Note>(&mut conn)
            .map_err(|e| NotesError::Database(e.to_string()))
    }

    pub async fn update_note(
        &self,
        note_id: Uuid,
        user: &AuthenticatedUser,
        request: UpdateNoteRequest,
    ) -> Result<Note, NotesError> {
        let mut conn = self.pool.get().map_err(|_| NotesError::DatabaseConnection)?;

        let client_id: Option<Uuid> = client_notes::table
            .find(note_id)
            .select(client_notes::client_id)
            .first(&mut conn)
            .optional()
            .map_err(|e| NotesError::Database(e.to_string()))?;
        let client_id = client_id.ok_or(NotesError::NotFound)?;

        if !has_client_access(&mut conn, client_id, user)
            .map_err(|e| NotesError::Database(e.to_string()))?
        {
            return Err(NotesError::Forbidden);
        }

        diesel::update(client_notes::table.find(note_id))
            .set(&NoteChanges {
                title: request.title.as_deref(),
                body: request.body.as_deref(),
                pinned: request.pinned,
                updated_at: Utc::now(),
            })
            .get_result::<Note>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => NotesError::NotFound,
                other => NotesError::Database(other.to_string()),
            })
    }
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/clients/:id/notes", get(list_notes))
        .route("/api/clients/:id/notes", post(create_note))
        .route("/api/notes/:id", put(update_note))
}

pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Note>>, NotesError> {
    let service = NotesService::new(state.conn.clone());
    Ok(Json(service.list_notes(client_id, &user).await?))
}

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<CreateNoteRequest>,
) -> Result<Json<Note>, NotesError> {
    let service = NotesService::new(state.conn.clone());
    Ok(Json(service.create_note(client_id, &user, request).await?))
}

pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(note_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, NotesError> {
    let service = NotesService::new(state.conn.clone());
    Ok(Json(service.update_note(note_id, &user, request).await?))
}
