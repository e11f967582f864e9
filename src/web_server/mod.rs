//! Router assembly and server lifecycle.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::security::create_cors_layer;
use crate::shared::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Room above the upload cap so oversized files reach the handler and
    // get the specific rejection instead of a generic 413.
    let body_limit = state.config.storage.max_file_size as usize + 8 * 1024 * 1024;

    let api_router = Router::new()
        .route("/health", get(health_check))
        .merge(crate::auth::configure())
        .merge(crate::clients::configure())
        .merge(crate::customers::configure())
        .merge(crate::leads::configure())
        .merge(crate::todos::configure())
        .merge(crate::chatter::configure())
        .merge(crate::notes::configure())
        .merge(crate::meetings::configure())
        .merge(crate::templates::configure())
        .merge(crate::files::configure())
        .merge(crate::email::configure())
        .merge(crate::webhooks::configure())
        .merge(crate::admin::configure());

    api_router
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CookieManagerLayer::new())
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn run_server(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {addr}");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
