//! # Service Bootstrap
//!
//! Wires the production collaborators into a [`RefreshOrchestrator`]:
//!
//! 1. **Issuer client** from [`IssuerConfig`] (node URLs, basic auth).
//! 2. **Document loader** sharing the issuer timeout and IPFS gateway.
//! 3. **Provider registry** from the YAML file at
//!    [`AppConfig::providers_config`].
//! 4. **Claim oracle** for iden3 claims.

use std::sync::Arc;
use std::time::Duration;

use refresh_claim::Iden3ClaimOracle;
use refresh_engine::{ContextAggregator, IndexImpactAnalyzer, RefreshOrchestrator};
use refresh_issuer_client::{HttpDocumentLoader, IssuerClient, IssuerConfig, IssuerError};
use refresh_providers::ProviderRegistry;

use crate::state::{AppConfig, AppState};

/// Errors during service bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("issuer client: {0}")]
    Issuer(#[from] IssuerError),

    #[error("provider configuration: {0}")]
    Providers(#[from] refresh_providers::ConfigError),

    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build the application state from configuration.
pub fn bootstrap(config: AppConfig, issuer: IssuerConfig) -> Result<AppState, BootstrapError> {
    let timeout = Duration::from_secs(issuer.timeout_secs);
    let loader = HttpDocumentLoader::new(timeout, issuer.ipfs_gateway.clone())?;

    let provider_http = reqwest::Client::builder().timeout(timeout).build()?;
    let providers = ProviderRegistry::from_file(&config.providers_config, provider_http)?;
    if providers.is_empty() {
        tracing::warn!(
            path = %config.providers_config.display(),
            "no providers configured, every refresh will be rejected"
        );
    }

    let store = IssuerClient::new(issuer)?;
    let analyzer = IndexImpactAnalyzer::new(
        Arc::new(Iden3ClaimOracle::new()),
        ContextAggregator::new(Arc::new(loader)),
    );
    let orchestrator = RefreshOrchestrator::new(Arc::new(store), Arc::new(providers), analyzer);

    tracing::info!(
        port = config.port,
        request_timeout = ?config.request_timeout,
        "refresh service bootstrapped"
    );
    Ok(AppState::new(config, orchestrator))
}
