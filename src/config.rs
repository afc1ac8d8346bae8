use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Settings for `serve`.
///
/// Resolved by clap: CLI flag, then `STUDY_PLANNER_BIND` / `STUDY_PLANNER_PORT` /
/// `ALLOWED_ORIGINS`, then the defaults below.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 8000;
    pub const DEFAULT_ORIGINS: &'static str = "http://localhost:3000";
    pub const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

    pub fn new(bind: impl Into<String>, port: u16, allowed_origins: Vec<String>) -> Self {
        Self {
            bind: bind.into(),
            port,
            allowed_origins: allowed_origins
                .into_iter()
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// `*` anywhere in the list allows every origin. Entries that are not
    /// valid header values are skipped with a warning.
    pub fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
            .max_age(Self::PREFLIGHT_MAX_AGE);

        if self.allowed_origins.iter().any(|origin| origin == "*") {
            return layer.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        layer.allow_origin(AllowOrigin::list(origins))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_BIND,
            Self::DEFAULT_PORT,
            vec![Self::DEFAULT_ORIGINS.to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_address() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.address(), "127.0.0.1:8000");
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let cfg = ServerConfig::new(
            "0.0.0.0",
            9000,
            vec![
                " http://localhost:3000".to_string(),
                "".to_string(),
                "https://planner.example.com ".to_string(),
            ],
        );
        assert_eq!(
            cfg.allowed_origins,
            vec!["http://localhost:3000", "https://planner.example.com"]
        );
    }
}
