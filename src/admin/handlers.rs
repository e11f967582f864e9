use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::service::{AdminService, AdminUserView, Setting};
use super::AdminError;
use crate::security::{AdminUser, SuperAdminUser};
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
    pub super_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct PutSettingRequest {
    pub key: String,
    pub value: String,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:id/role", put(update_role))
        .route("/api/admin/users/:id/active", put(set_active))
        .route("/api/admin/settings", get(list_settings))
        .route("/api/admin/settings", put(put_setting))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminUserView>>, AdminError> {
    let service = AdminService::new(state.conn.clone());
    Ok(Json(service.list_users().await?))
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    _superadmin: SuperAdminUser,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<AdminUserView>, AdminError> {
    let service = AdminService::new(state.conn.clone());
    Ok(Json(
        service
            .update_role(user_id, &request.role, request.super_role.as_deref())
            .await?,
    ))
}

pub async fn set_active(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    _superadmin: SuperAdminUser,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<AdminUserView>, AdminError> {
    let service = AdminService::new(state.conn.clone());
    Ok(Json(service.set_active(user_id, request.is_active).await?))
}

pub async fn list_settings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<Setting>>, AdminError> {
    let service = AdminService::new(state.conn.clone());
    Ok(Json(service.list_settings().await?))
}

pub async fn put_setting(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(request): Json<PutSettingRequest>,
) -> Result<Json<Setting>, AdminError> {
    let service = AdminService::new(state.conn.clone());
    Ok(Json(service.put_setting(&request.key, &request.value).await?))
}
