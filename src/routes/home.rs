//! Homepage endpoint.
//!
//! Exercises the full transaction/span/breadcrumb instrumentation path
//! around a small piece of simulated work.

use crate::monitor::Level;
use crate::state::AppState;
use axum::{extract::State, routing::get, Router};
use std::time::Duration;

/// How long the synthetic operation blocks the handler.
const SIMULATED_WORK: Duration = Duration::from_millis(100);

/// Creates the homepage routes.
pub fn home_routes(state: AppState) -> Router {
    Router::new().route("/", get(home)).with_state(state)
}

/// Homepage handler.
///
/// Starts a root transaction with one child span around the simulated work
/// and records a breadcrumb for the visit. The transaction handle finishes
/// on drop, so every exit path closes it after its span.
async fn home(State(state): State<AppState>) -> &'static str {
    let mut transaction = state.monitor().start_transaction("GET /", "http.server");

    let mut span = transaction.start_child("custom.operation");
    tokio::time::sleep(SIMULATED_WORK).await;
    span.finish();

    state
        .monitor()
        .add_breadcrumb("User visited the homepage", Level::Info);

    transaction.finish();
    "Hello, World!"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_home_status_and_body() {
        let (state, _recorder) = AppState::with_recording_monitor();
        let app = home_routes(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Hello, World!");
    }

    #[tokio::test]
    async fn test_home_reports_one_transaction_with_one_span() {
        let (state, recorder) = AppState::with_recording_monitor();
        let app = home_routes(state);

        app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let recorded = recorder.snapshot();
        assert_eq!(recorded.transactions.len(), 1);

        let transaction = &recorded.transactions[0];
        assert_eq!(transaction.name, "GET /");
        assert_eq!(transaction.spans.len(), 1);
        assert_eq!(transaction.spans[0].op, "custom.operation");

        // The span must close before its parent does.
        let span_finished = transaction.spans[0].finished_at.expect("span not finished");
        let transaction_finished = transaction
            .finished_at
            .expect("transaction not finished");
        assert!(span_finished <= transaction_finished);
    }

    #[tokio::test]
    async fn test_home_records_a_breadcrumb() {
        let (state, recorder) = AppState::with_recording_monitor();
        let app = home_routes(state);

        app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let recorded = recorder.snapshot();
        assert_eq!(recorded.breadcrumbs.len(), 1);
        assert_eq!(recorded.breadcrumbs[0].message, "User visited the homepage");
        assert_eq!(recorded.breadcrumbs[0].level, Level::Info);
    }
}
