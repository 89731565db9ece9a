//! Simulated error endpoint.
//!
//! Exercises the SDK's exception-capture path with a synthetic error. This
//! is the only route that responds non-2xx, and it does so per request
//! without ever affecting the process.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use thiserror::Error;

/// The synthetic error reported by the `/error` route.
#[derive(Debug, Error)]
#[error("something went wrong")]
struct SimulatedError;

/// Creates the error demo routes.
pub fn error_routes(state: AppState) -> Router {
    Router::new()
        .route("/error", get(trigger_error))
        .with_state(state)
}

/// Error handler.
///
/// Captures a synthetic error (fire-and-forget) and surfaces its message to
/// the caller with a 500 status.
async fn trigger_error(State(state): State<AppState>) -> (StatusCode, String) {
    let error = SimulatedError;
    state.monitor().capture_error(&error);
    (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}
