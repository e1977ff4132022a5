//! Debounced Query Buffer - Stable-value propagation.
//!
//! Decouples rapid input (keystrokes) from expensive downstream work
//! (filter recomputation, address writes). The output signal only updates
//! after the input has been stable for the configured delay; each new
//! sample cancels the pending one, so the output always reflects the most
//! recent sample - no stale overwrite is possible.
//!
//! Built on the [`timers`](super::timers) service, so tests drive it with
//! a virtual clock.

use spark_signals::{Signal, signal};
use std::cell::Cell;
use std::rc::Rc;

use super::timers::{TimerHandle, clear_timeout, set_timeout};

/// A debounced value: feed samples in, read the settled value out.
///
/// Clone shares the same underlying buffer (both handles feed/observe the
/// same output signal).
#[derive(Clone)]
pub struct Debounced<T: Clone + PartialEq + 'static> {
    delay_ms: u64,
    output: Signal<T>,
    latest: Rc<Cell<Option<T>>>,
    pending: Rc<Cell<Option<TimerHandle>>>,
}

impl<T: Clone + PartialEq + 'static> Debounced<T> {
    /// Create a buffer seeded with `initial`; the output starts there.
    pub fn new(initial: T, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            output: signal(initial),
            latest: Rc::new(Cell::new(None)),
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Feed a new input sample, resetting the pending window.
    ///
    /// The output updates only once the input has been stable for the
    /// configured delay. A zero delay still defers to the next timer pump
    /// (never synchronous), keeping call sites re-entrancy free.
    pub fn feed(&self, value: T) {
        if let Some(handle) = self.pending.take() {
            clear_timeout(handle);
        }
        self.latest.set(Some(value.clone()));

        let output = self.output.clone();
        let latest = self.latest.clone();
        let pending = self.pending.clone();
        let handle = set_timeout(self.delay_ms, move || {
            pending.set(None);
            if let Some(settled) = latest.take() {
                output.set(settled);
            }
        });
        self.pending.set(Some(handle));
    }

    /// The settled output value.
    pub fn get(&self) -> T {
        self.output.get()
    }

    /// The settled output signal, for reactive tracking.
    pub fn output(&self) -> Signal<T> {
        self.output.clone()
    }

    /// Apply any pending sample immediately, skipping the rest of the window.
    pub fn flush(&self) {
        if let Some(handle) = self.pending.take() {
            clear_timeout(handle);
        }
        if let Some(settled) = self.latest.take() {
            self.output.set(settled);
        }
    }

    /// Drop any pending sample without applying it (unmount path).
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.take() {
            clear_timeout(handle);
        }
        self.latest.set(None);
    }

    /// Whether a sample is waiting out its stability window.
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

// =============================================================================
// TESTS
// =============================================================================
