use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ChatterError;
use super::service::ChatterService;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::leads::{ensure_lead_access, LeadAccessError};
use crate::shared::state::AppState;

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leads/:id/chatter", get(get_chatter))
        .route("/api/leads/:id/chatter", post(send_message))
}

/// Full history, or the incremental tail when `?after=` is given. This is
/// the endpoint polling clients hit every few seconds.
pub async fn get_chatter(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    Query(query): Query<ChatterQuery>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ChatterMessage>>, ChatterError> {
    check_access(&state, lead_id, &user)?;

    let service = ChatterService::new(state.conn.clone());
    let messages = match query.after {
        Some(after) => service.since(lead_id, after)?,
        None => service.history(lead_id)?,
    };
    Ok(Json(messages))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatterMessage>, ChatterError> {
    check_access(&state, lead_id, &user)?;

    let author_id = user.user_id().map_err(|_| ChatterError::Forbidden)?;
    let service = ChatterService::new(state.conn.clone());
    Ok(Json(service.send(lead_id, author_id, &request.body)?))
}

fn check_access(
    state: &AppState,
    lead_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<(), ChatterError> {
    let mut conn = state.conn.get().map_err(|_| ChatterError::DatabaseConnection)?;
    ensure_lead_access(&mut conn, lead_id, user).map_err(|e| match e {
        LeadAccessError::NotFound => ChatterError::LeadNotFound,
        LeadAccessError::Forbidden => ChatterError::Forbidden,
        LeadAccessError::Database(err) => ChatterError::Database(err.to_string()),
    })?;
    Ok(())
}
