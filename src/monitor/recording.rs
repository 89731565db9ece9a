//! In-memory monitor implementation.
//!
//! Records every SDK call instead of transmitting it. Suitable for tests and
//! local development; nothing is persisted or sent anywhere.

use super::{Level, Monitor, ReportScope, Span, Transaction};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Monitor that records calls in memory.
///
/// Cloning is cheap and clones share the same underlying recording, so a
/// test can keep one handle for assertions while the server owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingMonitor {
    events: Arc<RwLock<RecordedEvents>>,
}

/// Everything a [`RecordingMonitor`] has observed, in call order.
#[derive(Debug, Clone, Default)]
pub struct RecordedEvents {
    /// Started transactions, including their child spans.
    pub transactions: Vec<RecordedTransaction>,
    /// Recorded breadcrumbs.
    pub breadcrumbs: Vec<RecordedBreadcrumb>,
    /// Captured messages with their scope annotations.
    pub messages: Vec<RecordedMessage>,
    /// Display text of captured errors.
    pub errors: Vec<String>,
    /// Timeouts passed to flush calls.
    pub flushes: Vec<Duration>,
}

/// A recorded transaction.
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    /// Transaction name.
    pub name: String,
    /// Operation category.
    pub op: String,
    /// When the transaction started.
    pub started_at: Instant,
    /// When the transaction finished, if it has.
    pub finished_at: Option<Instant>,
    /// Child spans in creation order.
    pub spans: Vec<RecordedSpan>,
}

/// A recorded child span.
#[derive(Debug, Clone)]
pub struct RecordedSpan {
    /// Operation name.
    pub op: String,
    /// When the span started.
    pub started_at: Instant,
    /// When the span finished, if it has.
    pub finished_at: Option<Instant>,
}

/// A recorded breadcrumb.
#[derive(Debug, Clone)]
pub struct RecordedBreadcrumb {
    /// Breadcrumb message.
    pub message: String,
    /// Severity.
    pub level: Level,
}

/// A captured message together with the scope it was reported under.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    /// Message text.
    pub message: String,
    /// Severity.
    pub level: Level,
    /// Tags the scope carried.
    pub tags: BTreeMap<String, String>,
    /// Context objects the scope carried.
    pub contexts: BTreeMap<String, serde_json::Value>,
}

impl RecordingMonitor {
    /// Creates a new empty recording monitor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> RecordedEvents {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// A poisoned lock still holds valid records; recover the guard instead of
// discarding the telemetry.
fn write(events: &RwLock<RecordedEvents>) -> RwLockWriteGuard<'_, RecordedEvents> {
    events.write().unwrap_or_else(PoisonError::into_inner)
}

impl Monitor for RecordingMonitor {
    fn start_transaction(&self, name: &str, op: &str) -> Box<dyn Transaction> {
        let index = {
            let mut events = write(&self.events);
            events.transactions.push(RecordedTransaction {
                name: name.to_owned(),
                op: op.to_owned(),
                started_at: Instant::now(),
                finished_at: None,
                spans: Vec::new(),
            });
            events.transactions.len() - 1
        };

        Box::new(RecordingTransaction {
            events: Arc::clone(&self.events),
            index,
            finished: false,
        })
    }

    fn add_breadcrumb(&self, message: &str, level: Level) {
        write(&self.events).breadcrumbs.push(RecordedBreadcrumb {
            message: message.to_owned(),
            level,
        });
    }

    fn capture_message(&self, message: &str, level: Level, scope: &ReportScope) {
        write(&self.events).messages.push(RecordedMessage {
            message: message.to_owned(),
            level,
            tags: scope.tags().clone(),
            contexts: scope.contexts().clone(),
        });
    }

    fn capture_error(&self, error: &(dyn std::error::Error + 'static)) {
        write(&self.events).errors.push(error.to_string());
    }

    fn flush(&self, timeout: Duration) -> bool {
        write(&self.events).flushes.push(timeout);
        true
    }
}

struct RecordingTransaction {
    events: Arc<RwLock<RecordedEvents>>,
    index: usize,
    finished: bool,
}

impl Transaction for RecordingTransaction {
    fn start_child(&self, op: &str) -> Box<dyn Span> {
        let span_index = {
            let mut events = write(&self.events);
            let transaction = &mut events.transactions[self.index];
            transaction.spans.push(RecordedSpan {
                op: op.to_owned(),
                started_at: Instant::now(),
                finished_at: None,
            });
            transaction.spans.len() - 1
        };

        Box::new(RecordingSpan {
            events: Arc::clone(&self.events),
            transaction: self.index,
            index: span_index,
            finished: false,
        })
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        write(&self.events).transactions[self.index].finished_at = Some(Instant::now());
    }
}

impl Drop for RecordingTransaction {
    fn drop(&mut self) {
        self.finish();
    }
}

struct RecordingSpan {
    events: Arc<RwLock<RecordedEvents>>,
    transaction: usize,
    index: usize,
    finished: bool,
}

impl Span for RecordingSpan {
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        write(&self.events).transactions[self.transaction].spans[self.index].finished_at =
            Some(Instant::now());
    }
}

impl Drop for RecordingSpan {
    fn drop(&mut self) {
        self.finish();
    }
}
