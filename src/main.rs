use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crmserver::config::AppConfig;
use crmserver::shared::migration;
use crmserver::shared::state::AppState;
use crmserver::shared::utils::create_conn;
use crmserver::web_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crmserver=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let pool = create_conn(&config.database).context("failed to create database pool")?;
    migration::run(&pool).context("failed to run schema migration")?;

    let addr = config.server.socket_addr();
    let state = Arc::new(AppState::new(config, pool));

    info!("crmserver listening on {addr}");
    web_server::run_server(state, addr)
        .await
        .context("server exited with error")
}
