//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::monitor::{Monitor, RecordingMonitor, SentryMonitor};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Holds the process-wide monitoring client behind the [`Monitor`] seam so
/// handlers report telemetry without knowing which implementation is wired
/// in. Cloning is cheap; clones share the same client.
#[derive(Clone)]
pub struct AppState {
    /// The monitoring collaborator.
    monitor: Arc<dyn Monitor>,
}

impl AppState {
    /// Creates a new application state with the given monitor.
    pub fn new(monitor: Arc<dyn Monitor>) -> Self {
        Self { monitor }
    }

    /// Creates a new application state reporting to Sentry.
    ///
    /// The caller is responsible for initializing the Sentry client first
    /// (see [`crate::monitor::init_sentry`]); without one, every report is
    /// silently discarded.
    #[must_use]
    pub fn with_sentry_monitor() -> Self {
        Self::new(Arc::new(SentryMonitor))
    }

    /// Creates a new application state with an in-memory recording monitor.
    ///
    /// This is useful for development and testing. The returned
    /// [`RecordingMonitor`] handle shares the recording with the state, so
    /// tests can assert on everything the handlers reported.
    #[must_use]
    pub fn with_recording_monitor() -> (Self, RecordingMonitor) {
        let recorder = RecordingMonitor::new();
        (Self::new(Arc::new(recorder.clone())), recorder)
    }

    /// Returns a reference to the monitoring client.
    #[must_use]
    pub fn monitor(&self) -> &dyn Monitor {
        self.monitor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::Level;

    #[test]
    fn test_app_state_with_recording_monitor() {
        let (state, recorder) = AppState::with_recording_monitor();

        state.monitor().add_breadcrumb("Test", Level::Info);

        let recorded = recorder.snapshot();
        assert_eq!(recorded.breadcrumbs.len(), 1);
        assert_eq!(recorded.breadcrumbs[0].message, "Test");
    }

    #[test]
    fn test_app_state_is_clone() {
        let (state, recorder) = AppState::with_recording_monitor();
        let state2 = state.clone();

        // Both should share the same monitor
        state.monitor().add_breadcrumb("first", Level::Info);
        state2.monitor().add_breadcrumb("second", Level::Info);

        assert_eq!(recorder.snapshot().breadcrumbs.len(), 2);
    }
}
