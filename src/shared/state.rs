use crate::auth::AuthConfig;
use crate::config::AppConfig;
use crate::email::generator::EmailGenerator;
use crate::files::storage::DocumentClient;
use crate::shared::utils::DbPool;
use crate::webhooks::scoring::ScoringClient;

pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub auth: AuthConfig,
    pub documents: DocumentClient,
    pub scoring: ScoringClient,
    pub generator: EmailGenerator,
}

impl AppState {
    pub fn new(config: AppConfig, conn: DbPool) -> Self {
        Self {
            auth: AuthConfig::from_env(),
            documents: DocumentClient::new(&config.storage),
            scoring: ScoringClient::new(&config.scoring),
            generator: EmailGenerator::new(&config.generation),
            conn,
            config,
        }
    }
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            config: self.config.clone(),
            auth: self.auth.clone(),
            documents: self.documents.clone(),
            scoring: self.scoring.clone(),
            generator: self.generator.clone(),
        }
    }
}
