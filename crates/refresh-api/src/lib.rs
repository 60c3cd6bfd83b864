//! # refresh-api: Credential Refresh Service
//!
//! Axum HTTP front end for the refresh engine. A holder whose iden3
//! credential has expired asks for it to be reissued with current
//! attribute values.
//!
//! ## API Surface
//!
//! | Route | Module | Purpose |
//! |-------|--------|---------|
//! | `POST /v1/refresh` | [`routes::refresh`] | Refresh a credential |
//! | `GET /health/liveness` | | Process is up |
//! | `GET /health/readiness` | | Ready to serve |

pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::refresh::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness check: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: returns 200 once bootstrap has completed.
async fn readiness() -> &'static str {
    "ready"
}
