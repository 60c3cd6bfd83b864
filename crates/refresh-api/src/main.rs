//! # refresh-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for credential refresh.
//! Binds to configurable port (default 8080).

use refresh_api::state::AppConfig;
use refresh_issuer_client::IssuerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let issuer = IssuerConfig::from_env().map_err(|e| {
        tracing::error!("Issuer configuration invalid: {e}");
        e
    })?;
    tracing::debug!(?issuer, "issuer configuration loaded");

    let port = config.port;
    let state = refresh_api::bootstrap::bootstrap(config, issuer).map_err(|e| {
        tracing::error!("Bootstrap failed: {e}");
        e
    })?;

    let app = refresh_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Refresh service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
