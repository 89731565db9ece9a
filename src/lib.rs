//! Sentry Demo Server
//!
//! This crate provides a small HTTP server whose routes exist to exercise the
//! Sentry SDK's instrumentation API: transactions, spans, breadcrumbs, tags,
//! structured context, message capture, and exception capture.
//!
//! # Architecture
//!
//! The server is built on Axum and Tokio. Handlers talk to the SDK through
//! the [`monitor::Monitor`] seam held in [`AppState`], so tests can swap the
//! real client for an in-memory recorder.
//!
//! # Example
//!
//! ```no_run
//! use sentry_demo::{run_server_with_config, AppState, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let _sentry = sentry_demo::init_sentry(&config.monitor)?;
//!
//!     tokio::runtime::Builder::new_multi_thread()
//!         .enable_all()
//!         .build()?
//!         .block_on(run_server_with_config(
//!             config,
//!             AppState::with_sentry_monitor(),
//!         ))
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
pub mod monitor;
mod routes;
mod state;

pub use config::{Config, MonitorConfig};
pub use monitor::init_sentry;
pub use state::AppState;

use anyhow::Result;
use axum::extract::Request;
use axum::Router;
use sentry_tower::{NewSentryLayer, SentryHttpLayer};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// How long shutdown waits for buffered telemetry before dropping it.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs the demo server with the provided configuration and state.
///
/// Listens until a SIGTERM/SIGINT arrives, then shuts down gracefully and
/// flushes buffered telemetry for at most two seconds. Anything not
/// delivered within that bound is dropped.
///
/// # Errors
///
/// Returns an error if:
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config, state: AppState) -> Result<()> {
    serve_until(config, state, shutdown_signal()).await
}

/// Binds the listener and serves until `shutdown` completes, then performs
/// the bounded telemetry flush.
///
/// Taking the shutdown trigger as a future keeps the whole lifecycle
/// drivable from a test; production wires in [`shutdown_signal`].
async fn serve_until<F>(config: Config, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.socket_addr();

    tracing::info!(
        host = %config.host,
        port = %config.port,
        release = %config.monitor.release,
        "Sentry demo server starting"
    );

    let app = create_router(state.clone());
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    if !state.monitor().flush(SHUTDOWN_FLUSH_TIMEOUT) {
        tracing::warn!("Telemetry flush timed out; undelivered events were dropped");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// Every route sits behind a hub-per-request layer, which isolates
/// breadcrumbs and scope data between concurrent requests and captures
/// panics, and a transaction layer that reports method, path, and status for
/// requests that do not start their own transaction.
///
/// This function is public to allow testing the router without starting a
/// full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::home_routes(state.clone()))
        .merge(routes::error_routes(state.clone()))
        .merge(routes::performance_routes(state.clone()))
        .merge(routes::reporting_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(NewSentryLayer::<Request>::new_from_top())
                .layer(SentryHttpLayer::with_transaction()),
        )
}

/// Completes once SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("ctrl-c handler could not be installed");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("SIGTERM handler could not be installed");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutdown signal received; draining connections");
}
