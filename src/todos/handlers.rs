use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

use super::error::TodosError;
use super::service::TodosService;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::shared::state::AppState;

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leads/:id/todos", get(list_todos))
        .route("/api/leads/:id/todos", post(create_todo))
        .route("/api/leads/:id/todos/instantiate", post(instantiate_template))
        .route("/api/todos/:id", put(update_todo))
        .route("/api/todos/:id", delete(delete_todo))
        .route("/api/todos/:id/notes", get(list_notes))
        .route("/api/todos/:id/notes", post(add_note))
}

pub async fn list_todos(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Todo>>, TodosError> {
    let service = TodosService::new(state.conn.clone());
    Ok(Json(service.list_todos(lead_id, &user).await?))
}

pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<CreateTodoRequest>,
) -> Result<Json<Todo>, TodosError> {
    let service = TodosService::new(state.conn.clone());
    Ok(Json(service.create_todo(lead_id, &user, request).await?))
}

pub async fn instantiate_template(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<InstantiateTemplateRequest>,
) -> Result<Json<Vec<Todo>>, TodosError> {
    let service = TodosService::new(state.conn.clone());
    Ok(Json(service.instantiate_template(lead_id, &user, request).await?))
}

pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, TodosError> {
    let service = TodosService::new(state.conn.clone());
    Ok(Json(service.update_todo(todo_id, &user, request).await?))
}

pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<StatusCode, TodosError> {
    let service = TodosService::new(state.conn.clone());
    service.delete_todo(todo_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<TodoNote>>, TodosError> {
    let service = TodosService::new(state.conn.clone());
    Ok(Json(service.list_notes(todo_id, &user).await?))
}

pub async fn add_note(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<CreateTodoNoteRequest>,
) -> Result<Json<TodoNote>, TodosError> {
    let service = TodosService::new(state.conn.clone());
    Ok(Json(service.add_note(todo_id, &user, request).await?))
}
