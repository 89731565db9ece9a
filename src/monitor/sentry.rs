//! Sentry-backed monitor implementation.
//!
//! [`init_sentry`] establishes the process-wide client; [`SentryMonitor`]
//! forwards the [`Monitor`] operations to the current hub.

use super::{Level, Monitor, ReportScope, Span, Transaction};
use crate::config::MonitorConfig;
use ::sentry::types::Dsn;
use ::sentry::{ClientInitGuard, ClientOptions, TransactionContext};
use anyhow::{ensure, Context as _, Result};
use std::time::Duration;

/// How long a dropped client guard waits for buffered telemetry.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Initializes the Sentry client from the monitoring configuration.
///
/// The returned guard must be kept alive for the process lifetime; dropping
/// it performs a bounded flush of buffered telemetry. Callers should invoke
/// this before starting the async runtime so worker threads inherit a hub
/// bound to the client.
///
/// # Errors
///
/// Returns an error if the DSN does not parse or the client comes up
/// disabled.
pub fn init_sentry(config: &MonitorConfig) -> Result<ClientInitGuard> {
    let dsn: Dsn = config
        .dsn
        .parse()
        .context("SENTRY_DSN is not a valid Sentry DSN")?;

    let guard = ::sentry::init(ClientOptions {
        dsn: Some(dsn),
        release: Some(config.release.clone().into()),
        traces_sample_rate: config.traces_sample_rate,
        shutdown_timeout: SHUTDOWN_FLUSH_TIMEOUT,
        ..Default::default()
    });
    ensure!(guard.is_enabled(), "Sentry client failed to initialize");

    Ok(guard)
}

/// Production monitor backed by the process-wide Sentry hub.
///
/// The type itself is stateless; [`init_sentry`] establishes the client that
/// the hub reports through. Without an initialized client every operation is
/// a cheap no-op, which is what tests rely on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentryMonitor;

impl Monitor for SentryMonitor {
    fn start_transaction(&self, name: &str, op: &str) -> Box<dyn Transaction> {
        Box::new(SentryTransaction {
            inner: ::sentry::start_transaction(TransactionContext::new(name, op)),
            finished: false,
        })
    }

    fn add_breadcrumb(&self, message: &str, level: Level) {
        ::sentry::add_breadcrumb(::sentry::Breadcrumb {
            message: Some(message.to_owned()),
            level: level.into(),
            ..Default::default()
        });
    }

    fn capture_message(&self, message: &str, level: Level, scope: &ReportScope) {
        // with_scope pushes a temporary scope for exactly this capture, so
        // the annotations never leak to concurrent or later events.
        ::sentry::with_scope(
            |sdk_scope| {
                for (key, value) in scope.tags() {
                    sdk_scope.set_tag(key, value);
                }
                for (key, data) in scope.contexts() {
                    sdk_scope.set_context(key, context_from_value(data));
                }
            },
            || {
                ::sentry::capture_message(message, level.into());
            },
        );
    }

    fn capture_error(&self, error: &(dyn std::error::Error + 'static)) {
        ::sentry::capture_error(error);
    }

    fn flush(&self, timeout: Duration) -> bool {
        ::sentry::Hub::current()
            .client()
            .is_some_and(|client| client.flush(Some(timeout)))
    }
}

struct SentryTransaction {
    inner: ::sentry::Transaction,
    finished: bool,
}

impl Transaction for SentryTransaction {
    fn start_child(&self, op: &str) -> Box<dyn Span> {
        Box::new(SentrySpan {
            inner: self.inner.start_child(op, ""),
            finished: false,
        })
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.inner.clone().finish();
        }
    }
}

impl Drop for SentryTransaction {
    fn drop(&mut self) {
        self.finish();
    }
}

struct SentrySpan {
    inner: ::sentry::Span,
    finished: bool,
}

impl Span for SentrySpan {
    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.inner.clone().finish();
        }
    }
}

impl Drop for SentrySpan {
    fn drop(&mut self) {
        self.finish();
    }
}

impl From<Level> for ::sentry::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Info => Self::Info,
            Level::Warning => Self::Warning,
            Level::Error => Self::Error,
        }
    }
}

/// Converts a JSON context value into the SDK's context representation.
///
/// Objects map field-by-field; any other value is wrapped under a `value`
/// key, since Sentry contexts are always key/value groups.
fn context_from_value(data: &serde_json::Value) -> ::sentry::protocol::Context {
    let fields = match data {
        serde_json::Value::Object(fields) => fields.clone().into_iter().collect(),
        other => std::iter::once(("value".to_owned(), other.clone())).collect(),
    };
    ::sentry::protocol::Context::Other(fields)
}
