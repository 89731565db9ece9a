//! Sentry Demo Server Binary
//!
//! Entry point for the Sentry-instrumented demo HTTP server.

#![deny(unsafe_code)]

use anyhow::Result;
use sentry_demo::{run_server_with_config, AppState, Config};

fn main() -> Result<()> {
    // Load environment variables from a .env file, if one exists
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // The Sentry client must exist before the runtime starts so every worker
    // thread reports through it; the guard flushes buffered telemetry when
    // main returns.
    let _sentry = sentry_demo::init_sentry(&config.monitor)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_server_with_config(
            config,
            AppState::with_sentry_monitor(),
        ))
}
