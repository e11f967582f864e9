use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

use super::error::CustomersError;
use super::service::CustomersService;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::shared::state::AppState;

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/clients/:id/customers", get(list_customers))
        .route("/api/clients/:id/customers", post(create_customer))
        .route("/api/customers/:id", get(get_customer))
        .route("/api/customers/:id", put(update_customer))
}

pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Customer>>, CustomersError> {
    let service = CustomersService::new(state.conn.clone());
    Ok(Json(service.list_customers(client_id, &user).await?))
}

pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Json<Customer>, CustomersError> {
    let service = CustomersService::new(state.conn.clone());
    Ok(Json(service.create_customer(client_id, &user, request).await?))
}

pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Customer>, CustomersError> {
    let service = CustomersService::new(state.conn.clone());
    Ok(Json(service.get_customer(customer_id, &user).await?))
}

pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, CustomersError> {
    let service = CustomersService::new(state.conn.clone());
    Ok(Json(service.update_customer(customer_id, &user, request).await?))
}
