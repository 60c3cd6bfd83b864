//! # Application State
//!
//! Shared state for the Axum application, passed to route handlers via the
//! `State` extractor. Holds the refresh orchestrator and the server
//! configuration. The orchestrator's collaborators are `Send + Sync` and
//! shared across concurrent requests.

use std::path::PathBuf;
use std::time::Duration;

use refresh_engine::RefreshOrchestrator;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Upper bound on one refresh, end to end.
    pub request_timeout: Duration,
    /// Path of the provider YAML document.
    pub providers_config: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            request_timeout: Duration::from_secs(60),
            providers_config: PathBuf::from("providers.yaml"),
        }
    }
}

impl AppConfig {
    /// Load from `PORT`, `REFRESH_REQUEST_TIMEOUT_SECS` and
    /// `REFRESH_PROVIDERS_CONFIG`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            request_timeout: std::env::var("REFRESH_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            providers_config: std::env::var("REFRESH_PROVIDERS_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.providers_config),
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: RefreshOrchestrator,
}

impl AppState {
    pub fn new(config: AppConfig, orchestrator: RefreshOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.providers_config, PathBuf::from("providers.yaml"));
    }
}
