//! Timer Service - Deterministic single-threaded scheduler.
//!
//! Everything time-based in the pipeline (debounce windows, the pagination
//! growth delay) goes through this module instead of spawning threads.
//! The shell pumps the clock from real elapsed time each tick; tests call
//! [`advance`] directly, which makes every timing-dependent behavior
//! deterministic.
//!
//! Semantics:
//! - Callbacks fire in due order; ties fire in registration order.
//! - A cleared timer never fires.
//! - Callbacks may schedule or clear other timers; newly scheduled timers
//!   fire within the same `advance` call if they come due inside it.
//!
//! # Example
//!
//! ```ignore
//! use folio_tui::state::timers::{set_timeout, advance, reset_timer_state};
//!
//! reset_timer_state();
//! let handle = set_timeout(150, || println!("due"));
//! advance(149); // nothing yet
//! advance(1);   // fires
//! ```

use std::cell::RefCell;

// =============================================================================
// TIMER REGISTRY
// =============================================================================

/// Callback scheduled to run once.
type TimerCallback = Box<dyn FnOnce()>;

struct PendingTimer {
    id: u64,
    due_at: u64,
    callback: TimerCallback,
}

struct TimerState {
    /// Virtual clock in milliseconds. Only moves via `advance`.
    now_ms: u64,
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl TimerState {
    fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            pending: Vec::new(),
        }
    }
}

thread_local! {
    static TIMERS: RefCell<TimerState> = RefCell::new(TimerState::new());
}

/// Opaque handle identifying a scheduled timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

// =============================================================================
// PUBLIC API
// =============================================================================

/// Schedule `callback` to run once, `delay_ms` after the current virtual time.
///
/// A zero delay fires on the next `advance` call (even `advance(0)`), not
/// synchronously - callers never observe reentrant callbacks.
pub fn set_timeout(delay_ms: u64, callback: impl FnOnce() + 'static) -> TimerHandle {
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        let id = timers.next_id;
        timers.next_id += 1;
        let due_at = timers.now_ms.saturating_add(delay_ms);
        timers.pending.push(PendingTimer {
            id,
            due_at,
            callback: Box::new(callback),
        });
        TimerHandle(id)
    })
}

/// Cancel a pending timeout. No-op if it already fired or was cleared.
pub fn clear_timeout(handle: TimerHandle) {
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        timers.pending.retain(|t| t.id != handle.0);
    });
}

/// Whether a handle still refers to a pending (unfired, uncleared) timer.
pub fn is_pending(handle: TimerHandle) -> bool {
    TIMERS.with(|timers| timers.borrow().pending.iter().any(|t| t.id == handle.0))
}

/// Number of pending timers (useful in tests).
pub fn pending_count() -> usize {
    TIMERS.with(|timers| timers.borrow().pending.len())
}

/// Current virtual time in milliseconds.
pub fn now_ms() -> u64 {
    TIMERS.with(|timers| timers.borrow().now_ms)
}

/// Move the virtual clock forward, firing every timer that comes due.
///
/// Runs callbacks outside the registry borrow, so callbacks are free to
/// schedule or clear timers. Timers scheduled by a callback fire in the
/// same call if their due time falls within the advanced window.
pub fn advance(delta_ms: u64) {
    let target = TIMERS.with(|timers| {
        let timers = timers.borrow();
        timers.now_ms.saturating_add(delta_ms)
    });

    loop {
        // Pull the earliest timer due at or before the target time.
        let next = TIMERS.with(|timers| {
            let mut timers = timers.borrow_mut();
            let earliest = timers
                .pending
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due_at <= target)
                .min_by_key(|(_, t)| (t.due_at, t.id))
                .map(|(i, _)| i);

            match earliest {
                Some(i) => {
                    let timer = timers.pending.remove(i);
                    // Clock catches up to each timer as it fires, so
                    // callbacks scheduling relative delays see a
                    // consistent "now".
                    timers.now_ms = timers.now_ms.max(timer.due_at);
                    Some(timer.callback)
                }
                None => {
                    timers.now_ms = target;
                    None
                }
            }
        });

        match next {
            Some(callback) => callback(),
            None => break,
        }
    }
}

/// Reset the clock and drop all pending timers (for testing).
pub fn reset_timer_state() {
    TIMERS.with(|timers| {
        *timers.borrow_mut() = TimerState::new();
    });
}

// =============================================================================
// TESTS
// =============================================================================
