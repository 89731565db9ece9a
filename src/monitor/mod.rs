//! Monitoring collaborator seam.
//!
//! Defines the [`Monitor`] trait that request handlers use to talk to the
//! external error/performance monitoring SDK, together with the transient
//! values that travel across it. The production implementation
//! ([`SentryMonitor`]) calls into the Sentry SDK; [`RecordingMonitor`] keeps
//! every call in memory for tests and development.

mod recording;
mod sentry;

pub use self::recording::{
    RecordedBreadcrumb, RecordedEvents, RecordedMessage, RecordedSpan, RecordedTransaction,
    RecordingMonitor,
};
pub use self::sentry::{init_sentry, SentryMonitor};

use std::collections::BTreeMap;
use std::time::Duration;

/// Severity attached to breadcrumbs and captured messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Informational note.
    Info,
    /// Unexpected but survivable condition.
    Warning,
    /// An error.
    Error,
}

/// Tags and structured context applied to a single capture call.
///
/// The scope is an immutable value threaded through the one reporting
/// operation it belongs to. Implementations merge it into an isolated SDK
/// scope for that call only, so concurrent requests never observe each
/// other's annotations and nothing leaks into later captures.
#[derive(Debug, Clone, Default)]
pub struct ReportScope {
    tags: BTreeMap<String, String>,
    contexts: BTreeMap<String, serde_json::Value>,
}

impl ReportScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a tag key/value pair.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Attaches a named structured context object.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, data: serde_json::Value) -> Self {
        self.contexts.insert(key.into(), data);
        self
    }

    /// Returns the attached tags.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Returns the attached context objects.
    #[must_use]
    pub fn contexts(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.contexts
    }
}

/// Interface to the external monitoring SDK.
///
/// Implementations must be safe for concurrent use from any number of
/// request handlers. Every method is fire-and-forget from the caller's
/// perspective except [`Monitor::flush`].
pub trait Monitor: Send + Sync {
    /// Starts a root transaction for one logical unit of work.
    fn start_transaction(&self, name: &str, op: &str) -> Box<dyn Transaction>;

    /// Records a breadcrumb; the SDK attaches it to the next reported event.
    fn add_breadcrumb(&self, message: &str, level: Level);

    /// Reports an informational message, with `scope` merged into an
    /// isolated scope for this one call.
    fn capture_message(&self, message: &str, level: Level, scope: &ReportScope);

    /// Reports an error as a captured exception.
    fn capture_error(&self, error: &(dyn std::error::Error + 'static));

    /// Flushes buffered telemetry, waiting at most `timeout`.
    ///
    /// Returns `true` if everything was delivered within the bound;
    /// telemetry that misses the bound is dropped.
    fn flush(&self, timeout: Duration) -> bool;
}

/// A root transaction in flight.
///
/// Finishing is idempotent, and an unfinished transaction finishes when its
/// handle drops, so every exit path closes it exactly once. Children must be
/// finished before their parent.
pub trait Transaction: Send {
    /// Starts a child span nested under this transaction.
    fn start_child(&self, op: &str) -> Box<dyn Span>;

    /// Finishes the transaction; later calls are no-ops.
    fn finish(&mut self);
}

/// A timed sub-operation nested within a transaction's lifetime.
///
/// Same finishing discipline as [`Transaction`]: idempotent, and guaranteed
/// on drop.
pub trait Span: Send {
    /// Finishes the span; later calls are no-ops.
    fn finish(&mut self);
}
