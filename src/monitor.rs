//! Error Monitor - Bounded in-memory diagnostic log.
//!
//! Every caught error in the client lands here; nothing is silently
//! swallowed. The queue is bounded (oldest entries evicted past the cap)
//! and each recorded entry is also emitted through `tracing` at a level
//! matching its severity.
//!
//! The monitor is an explicitly constructed, explicitly passed handle -
//! not a hidden global - so tests substitute a fresh instance per run.
//! Cloning shares the underlying queue.

use spark_signals::{Signal, signal};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

use crate::state::timers;

/// How many entries the queue retains before evicting the oldest.
pub const MAX_QUEUE_SIZE: usize = 50;

/// Severity of a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One recorded error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: String,
    /// Backtrace or extra context, when available.
    pub detail: Option<String>,
    /// Which component reported it.
    pub component: String,
    pub severity: Severity,
    /// Virtual-clock timestamp (ms) at record time.
    pub at_ms: u64,
}

struct MonitorState {
    queue: VecDeque<ErrorEntry>,
    latest: Signal<Option<ErrorEntry>>,
}

/// Shared handle to the diagnostic log.
#[derive(Clone)]
pub struct ErrorMonitor {
    inner: Rc<RefCell<MonitorState>>,
}

impl ErrorMonitor {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MonitorState {
                queue: VecDeque::new(),
                latest: signal(None),
            })),
        }
    }

    /// Record an error. Evicts the oldest entry once the cap is reached
    /// and mirrors the entry into the tracing stream.
    pub fn record(
        &self,
        component: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        detail: Option<String>,
    ) {
        let entry = ErrorEntry {
            message: message.into(),
            detail,
            component: component.into(),
            severity,
            at_ms: timers::now_ms(),
        };

        match severity {
            Severity::Low => debug!(component = %entry.component, "{}", entry.message),
            Severity::Medium => info!(component = %entry.component, "{}", entry.message),
            Severity::High => warn!(component = %entry.component, "{}", entry.message),
            Severity::Critical => error!(component = %entry.component, "{}", entry.message),
        }

        let mut state = self.inner.borrow_mut();
        if state.queue.len() >= MAX_QUEUE_SIZE {
            state.queue.pop_front();
        }
        state.queue.push_back(entry.clone());
        state.latest.set(Some(entry));
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ErrorEntry> {
        let state = self.inner.borrow();
        let skip = state.queue.len().saturating_sub(limit);
        state.queue.iter().skip(skip).cloned().collect()
    }

    /// Total entries currently retained.
    pub fn len(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().queue.is_empty()
    }

    /// Reactive feed of the latest entry, for the dev overlay.
    pub fn latest_signal(&self) -> Signal<Option<ErrorEntry>> {
        self.inner.borrow().latest.clone()
    }

    pub fn clear(&self) {
        let mut state = self.inner.borrow_mut();
        state.queue.clear();
        state.latest.set(None);
    }
}

impl Default for ErrorMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_recent() {
        let monitor = ErrorMonitor::new();
        monitor.record("embed", Severity::High, "failed to load", None);
        monitor.record("api", Severity::Medium, "404", Some("GET /api/x".into()));

        let recent = monitor.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "failed to load");
        assert_eq!(recent[1].component, "api");
        assert_eq!(recent[1].detail.as_deref(), Some("GET /api/x"));
    }

    #[test]
    fn test_recent_limit_returns_newest() {
        let monitor = ErrorMonitor::new();
        for i in 0..5 {
            monitor.record("test", Severity::Low, format!("e{i}"), None);
        }
        let recent = monitor.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "e3");
        assert_eq!(recent[1].message, "e4");
    }

    #[test]
    fn test_eviction_at_cap() {
        let monitor = ErrorMonitor::new();
        for i in 0..(MAX_QUEUE_SIZE + 10) {
            monitor.record("test", Severity::Low, format!("e{i}"), None);
        }
        assert_eq!(monitor.len(), MAX_QUEUE_SIZE);

        // Oldest ten were evicted.
        let recent = monitor.recent(MAX_QUEUE_SIZE);
        assert_eq!(recent[0].message, "e10");
    }

    #[test]
    fn test_latest_signal_tracks_records() {
        let monitor = ErrorMonitor::new();
        let latest = monitor.latest_signal();
        assert_eq!(latest.get(), None);

        monitor.record("shell", Severity::Critical, "boom", None);
        assert_eq!(latest.get().unwrap().message, "boom");

        monitor.clear();
        assert_eq!(latest.get(), None);
        assert!(monitor.is_empty());
    }

    #[test]
    fn test_clones_share_queue() {
        let monitor = ErrorMonitor::new();
        let clone = monitor.clone();
        clone.record("a", Severity::Low, "shared", None);
        assert_eq!(monitor.len(), 1);
    }
}
