use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ClientsError;
use super::service::ClientsService;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::shared::state::AppState;

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/clients", get(list_clients))
        .route("/api/clients", post(create_client))
        .route("/api/clients/:id", get(get_client))
        .route("/api/clients/:id", put(update_client))
        .route("/api/clients/:id/members", get(list_members))
        .route("/api/clients/:id/members", post(add_member))
        .route("/api/clients/:id/members/:user_id", delete(remove_member))
}

pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Client>>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.list_clients(&user).await?))
}

pub async fn create_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<Client>, ClientsError> {
    let user_id = user.user_id().map_err(|_| ClientsError::Forbidden)?;
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.create_client(user_id, request).await?))
}

pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Client>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.get_client(client_id, &user).await?))
}

pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<Client>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.update_client(client_id, &user, request).await?))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ClientMember>>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.list_members(client_id, &user).await?))
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<AddMemberRequest>,
) -> Result<StatusCode, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    service.add_member(client_id, &user, request).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((client_id, member_user_id)): Path<(Uuid, Uuid)>,
    user: AuthenticatedUser,
) -> Result<StatusCode, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    service.remove_member(client_id, &user, member_user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
