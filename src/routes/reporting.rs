//! Message-capture endpoints.
//!
//! Three routes exercising plain message capture and scoped tag/context
//! annotation. Each request builds its own [`ReportScope`], so concurrent
//! requests never see each other's annotations.

use crate::monitor::{Level, ReportScope};
use crate::state::AppState;
use axum::{extract::State, routing::get, Router};
use serde_json::json;

/// Creates the reporting demo routes.
pub fn reporting_routes(state: AppState) -> Router {
    Router::new()
        .route("/feedback", get(feedback))
        .route("/custom-tags", get(custom_tags))
        .route("/context", get(context))
        .with_state(state)
}

/// Feedback handler: captures a plain informational message.
async fn feedback(State(state): State<AppState>) -> &'static str {
    state
        .monitor()
        .capture_message("User feedback collected", Level::Info, &ReportScope::new());
    "Thank you for your feedback!"
}

/// Custom-tags handler: captures a message annotated with a fixed tag.
async fn custom_tags(State(state): State<AppState>) -> &'static str {
    let scope = ReportScope::new().with_tag("custom-tag", "example");
    state
        .monitor()
        .capture_message("Custom tags added", Level::Info, &scope);
    "Custom tags added"
}

/// Context handler: captures a message annotated with structured context.
async fn context(State(state): State<AppState>) -> &'static str {
    let scope = ReportScope::new().with_context("example", json!({ "key": "value" }));
    state
        .monitor()
        .capture_message("Context information added", Level::Info, &scope);
    "Context information added"
}
