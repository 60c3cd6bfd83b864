//! # Credential Refresh
//!
//! - `POST /v1/refresh`: refresh an expired credential and return the
//!   newly issued one.
//!
//! Each refresh is bounded by [`AppConfig::request_timeout`]. On timeout the
//! pipeline is cancelled and the caller gets 504.
//!
//! [`AppConfig::request_timeout`]: crate::state::AppConfig::request_timeout

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use refresh_engine::RefreshRequest;
use refresh_vc::W3CCredential;

use crate::error::AppError;
use crate::extractors::extract_validated_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/refresh", post(refresh_credential))
}

async fn refresh_credential(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<W3CCredential>, AppError> {
    let request = extract_validated_json(body)?;
    let credential_id = request.credential_id.clone();
    let timeout = state.config.request_timeout;

    let refreshed = tokio::time::timeout(timeout, state.orchestrator.process(request))
        .await
        .map_err(|_| {
            tracing::warn!(credential_id = %credential_id, ?timeout, "refresh timed out");
            AppError::Timeout(timeout)
        })??;

    Ok(Json(refreshed))
}
