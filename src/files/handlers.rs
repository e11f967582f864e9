use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::error::FilesError;
use crate::auth::AuthenticatedUser;
use crate::leads::{ensure_lead_access, LeadAccessError};
use crate::shared::models::lead_files;
use crate::shared::state::AppState;

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = lead_files)]
pub struct LeadFile {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = lead_files)]
struct NewLeadFileRow<'a> {
    id: Uuid,
    lead_id: Uuid,
    file_name: &'a str,
    file_path: &'a str,
    file_size: i64,
    mime_type: Option<&'a str>,
    uploaded_by: Uuid,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/files/upload", post(upload_file))
        .route("/api/leads/:id/files", get(list_files))
}

/// Upload proxy: multipart `file` + `lead_id`, size-capped before the
/// external call. A failure at any hop aborts the whole operation; a file
/// accepted by the document API whose row insert then fails is not rolled
/// back, matching the original design gap.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<LeadFile>, FilesError> {
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut file_data: Option<Vec<u8>> = None;
    let mut lead_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FilesError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                mime_type = field.content_type().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| FilesError::Validation(format!("failed to read file: {e}")))?;
                file_data = Some(bytes.to_vec());
            }
            "lead_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| FilesError::Validation(format!("failed to read lead_id: {e}")))?;
                lead_id = Some(
                    Uuid::parse_str(text.trim())
                        .map_err(|_| FilesError::Validation("lead_id is not a UUID".to_string()))?,
                );
            }
            _ => {}
        }
    }

    let lead_id = lead_id.ok_or_else(|| FilesError::Validation("lead_id is required".to_string()))?;
    let file_name = file_name.ok_or(FilesError::MissingFile)?;
    let data = file_data.filter(|d| !d.is_empty()).ok_or(FilesError::MissingFile)?;

    // Reject oversized files before anything leaves this process.
    let cap = state.config.storage.max_file_size;
    if data.len() as i64 > cap {
        return Err(FilesError::TooLarge(cap));
    }

    {
        let mut conn = state.conn.get().map_err(|_| FilesError::DatabaseConnection)?;
        ensure_lead_access(&mut conn, lead_id, &user).map_err(access_error)?;
    }

    let mime_type = mime_type.or_else(|| {
        mime_guess::from_path(&file_name)
            .first()
            .map(|m| m.to_string())
    });

    let file_size = data.len() as i64;
    let stored = state
        .documents
        .upload(&file_name, mime_type.as_deref(), data)
        .await?;
    info!("stored {file_name} ({file_size} bytes) at {}", stored.url);

    let uploaded_by = user.user_id().map_err(|_| FilesError::Forbidden)?;
    let mut conn = state.conn.get().map_err(|_| FilesError::DatabaseConnection)?;
    let row = diesel::insert_into(lead_files::table)
        .values(&NewLeadFileRow {
            id: Uuid::new_v4(),
            lead_id,
            file_name: &file_name,
            file_path: &stored.url,
            file_size,
            mime_type: mime_type.as_deref(),
            uploaded_by,
        })
        .get_result::<LeadFile>(&mut conn)
        .map_err(|e| FilesError::Database(e.to_string()))?;

    Ok(Json(row))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<LeadFile>>, FilesError> {
    let mut conn = state.conn.get().map_err(|_| FilesError::DatabaseConnection)?;
    ensure_lead_access(&mut conn, lead_id, &user).map_err(access_error)?;

    let rows: Vec<LeadFile> = lead_files::table
        .filter(lead_files::lead_id.eq(lead_id))
        .select(LeadFile::as_select())
        .order(lead_files::created_at.desc())
        .load(&mut conn)
        .map_err(|e| FilesError::Database(e.to_string()))?;

    Ok(Json(rows))
}

fn access_error(err: LeadAccessError) -> FilesError {
    match err {
        LeadAccessError::NotFound => FilesError::LeadNotFound,
        LeadAccessError::Forbidden => FilesError::Forbidden,
        LeadAccessError::Database(e) => FilesError::Database(e.to_string()),
    }
}
