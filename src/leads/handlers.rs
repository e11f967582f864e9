use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

use super::error::LeadsError;
use super::service::LeadsService;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::shared::state::AppState;

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/clients/:id/leads", get(list_leads))
        .route("/api/clients/:id/leads", post(create_lead))
        .route("/api/leads/:id", get(get_lead))
        .route("/api/leads/:id", put(update_lead))
}

pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Lead>>, LeadsError> {
    let service = LeadsService::new(state.conn.clone());
    Ok(Json(service.list_leads(client_id, &user).await?))
}

pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<CreateLeadRequest>,
) -> Result<Json<Lead>, LeadsError> {
    let service = LeadsService::new(state.conn.clone());
    Ok(Json(service.create_lead(client_id, &user, request).await?))
}

pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Lead>, LeadsError> {
    let service = LeadsService::new(state.conn.clone());
    Ok(Json(service.get_lead(lead_id, &user).await?))
}

pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateLeadRequest>,
) -> Result<Json<Lead>, LeadsError> {
    let service = LeadsService::new(state.conn.clone());
    Ok(Json(service.update_lead(lead_id, &user, request).await?))
}
