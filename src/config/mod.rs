use anyhow::Context;
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_MAX_FILE_SIZE: i64 = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub generation: GenerationConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL, used to build webhook callback URLs.
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// External document-hosting API the upload proxy forwards files to.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub api_url: String,
    pub api_token: String,
    pub max_file_size: i64,
}

/// External scoring/analysis API used by the customer generation trigger.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub api_url: String,
    pub api_key: String,
}

/// External text-generation API behind the email generator.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret expected in `x-webhook-token` on inbound webhooks.
    pub token: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.port)))
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10),
        };

        let port: u16 = env_parse("SERVER_PORT", 8080);
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server = ServerConfig {
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            host,
            port,
        };

        let storage = StorageConfig {
            api_url: env::var("DOCUMENT_API_URL").context("DOCUMENT_API_URL is required")?,
            api_token: env::var("DOCUMENT_API_TOKEN").unwrap_or_default(),
            max_file_size: env_parse("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
        };

        let scoring = ScoringConfig {
            api_url: env::var("SCORING_API_URL").context("SCORING_API_URL is required")?,
            api_key: env::var("SCORING_API_KEY").unwrap_or_default(),
        };

        let generation = GenerationConfig {
            api_url: env::var("GENERATION_API_URL").context("GENERATION_API_URL is required")?,
            api_key: env::var("GENERATION_API_KEY").unwrap_or_default(),
            model: env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "claude-3-sonnet-20240229".to_string()),
        };

        let webhook = WebhookConfig {
            token: env::var("WEBHOOK_TOKEN").unwrap_or_default(),
        };

        Ok(Self {
            server,
            database,
            storage,
            scoring,
            generation,
            webhook,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_falls_back_on_missing() {
        assert_eq!(env_parse("CRMSERVER_TEST_UNSET_KEY", 42u32), 42);
    }

    #[test]
    fn test_socket_addr_from_parts() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9100,
            public_url: "http://localhost:9100".to_string(),
        };
        assert_eq!(server.socket_addr().port(), 9100);
    }
}
