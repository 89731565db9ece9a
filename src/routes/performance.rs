//! Performance demo endpoint.
//!
//! Exercises nested span timing: a transaction with two sequential child
//! spans plus a trailing delay, so the collaborator receives a trace whose
//! durations are known in advance.

use crate::state::AppState;
use axum::{extract::State, routing::get, Router};
use std::time::Duration;

/// Duration of each instrumented child operation.
const OPERATION_DELAY: Duration = Duration::from_secs(1);
/// Uninstrumented delay after both operations.
const TRAILING_DELAY: Duration = Duration::from_secs(2);

/// Creates the performance demo routes.
pub fn performance_routes(state: AppState) -> Router {
    Router::new()
        .route("/performance", get(performance))
        .with_state(state)
}

/// Performance handler.
///
/// Runs `operation1` and `operation2` sequentially, each in its own child
/// span finished individually, then sleeps a further two seconds before
/// responding. Total wall time is roughly four seconds, which is the point:
/// the resulting trace shows where the latency lives.
async fn performance(State(state): State<AppState>) -> &'static str {
    let mut transaction = state
        .monitor()
        .start_transaction("GET /performance", "http.server");

    let mut span = transaction.start_child("operation1");
    tokio::time::sleep(OPERATION_DELAY).await;
    span.finish();

    let mut span = transaction.start_child("operation2");
    tokio::time::sleep(OPERATION_DELAY).await;
    span.finish();

    tokio::time::sleep(TRAILING_DELAY).await;

    transaction.finish();
    "Performance endpoint"
}
