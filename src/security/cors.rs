use axum::http::Method;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_methods: Vec<Method>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
            max_age_secs: 3600,
        }
    }
}

/// The API is consumed by browser clients served from elsewhere, so the
/// layer mirrors the permissive header set the serverless endpoints sent.
pub fn create_cors_layer() -> CorsLayer {
    let config = CorsConfig::default();
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(config.allowed_methods)
        .allow_headers(AllowHeaders::any())
        .max_age(std::time::Duration::from_secs(config.max_age_secs))
}
