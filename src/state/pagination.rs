//! Incremental List Renderer State - Cursor over a filtered collection.
//!
//! A growing visible prefix over the (already filtered) item collection.
//! The state machine is a single integer cursor plus a loading flag:
//!
//! - Initial: `visible = min(page_size, total)`, not loading.
//! - Growth: sensor visible AND not loading AND `visible < total` =>
//!   loading, then after the growth delay `visible += page_size`
//!   (clamped) and loading clears.
//! - Terminal: `visible == total` - the guard fails, the sentinel should
//!   be unmounted by the page.
//! - Reset: whenever the filtered collection's identity changes the
//!   cursor goes back to Initial. This is required correctness, not an
//!   optimization: a shrunk collection could otherwise leave an
//!   out-of-range cursor behind.
//!
//! The growth delay exists to let skeleton placeholders register; with a
//! real asynchronous backend it is replaced by actual fetch latency, so
//! it is a config knob (zero allowed), never a hard-coded constant.
//!
//! Progress is also announced through a status signal so non-visual
//! surfaces (screen readers, the shell status line) get feedback.

use spark_signals::{Signal, signal};
use std::cell::Cell;
use std::rc::Rc;

use super::timers::{TimerHandle, clear_timeout, set_timeout};
use super::visibility::VisibilitySensor;

// =============================================================================
// CONFIG
// =============================================================================

/// Tuning for a lazy list. Defaults match the desktop browse layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyListConfig {
    /// Items revealed per growth step (and initially).
    pub page_size: usize,
    /// Artificial reveal delay in ms. Zero fires on the next timer pump.
    pub growth_delay_ms: u64,
    /// Skeleton placeholders rendered while loading (capped by remainder).
    pub skeleton_count: usize,
    /// Per-item entrance animation on reveal. Cosmetic only.
    pub animate_in: bool,
    /// Stagger between item entrances, in ms per index.
    pub animation_delay_step_ms: u64,
}

impl Default for LazyListConfig {
    fn default() -> Self {
        Self {
            page_size: 9,
            growth_delay_ms: 150,
            skeleton_count: 6,
            animate_in: true,
            animation_delay_step_ms: 100,
        }
    }
}

/// Page size for a given viewport width in columns.
///
/// Narrow terminals behave like the phone layout, wide ones like desktop.
pub fn responsive_page_size(viewport_width: u16) -> usize {
    if viewport_width < 80 {
        4
    } else if viewport_width < 120 {
        6
    } else {
        9
    }
}

// =============================================================================
// LAZY LIST
// =============================================================================

struct LazyListState {
    config: Cell<LazyListConfig>,
    total: Cell<usize>,
    visible: Signal<usize>,
    loading: Signal<bool>,
    announcement: Signal<Option<String>>,
    pending: Cell<Option<TimerHandle>>,
}

/// Cursor state machine for one rendered list. Clone shares state.
#[derive(Clone)]
pub struct LazyList {
    inner: Rc<LazyListState>,
}

impl LazyList {
    pub fn new(config: LazyListConfig) -> Self {
        Self {
            inner: Rc::new(LazyListState {
                config: Cell::new(config),
                total: Cell::new(0),
                visible: signal(0),
                loading: signal(false),
                announcement: signal(None),
                pending: Cell::new(None),
            }),
        }
    }

    /// Reset to the Initial state for a (new) filtered collection.
    ///
    /// Cancels any in-flight growth step so a stale cursor can never be
    /// applied to the new collection.
    pub fn reset(&self, total: usize) {
        if let Some(handle) = self.inner.pending.take() {
            clear_timeout(handle);
        }
        let page = self.inner.config.get().page_size;
        self.inner.total.set(total);
        self.inner.visible.set(page.min(total));
        self.inner.loading.set(false);
        self.inner.announcement.set(None);
    }

    /// Update the page size (responsive layout). Affects future growth
    /// steps only; the current cursor is left alone.
    pub fn set_page_size(&self, page_size: usize) {
        let mut config = self.inner.config.get();
        config.page_size = page_size.max(1);
        self.inner.config.set(config);
    }

    /// Growth trigger: call whenever the sensor may have changed.
    ///
    /// Returns true when a growth step was started.
    pub fn poll(&self, sensor: &VisibilitySensor) -> bool {
        if sensor.is_visible() {
            self.request_more()
        } else {
            false
        }
    }

    /// Request the next page directly (keyboard "load more" path).
    pub fn request_more(&self) -> bool {
        if self.inner.loading.get() || !self.has_more() {
            return false;
        }
        self.inner.loading.set(true);
        self.inner
            .announcement
            .set(Some("Loading more items...".to_string()));

        let inner = self.inner.clone();
        let delay = self.inner.config.get().growth_delay_ms;
        let handle = set_timeout(delay, move || {
            inner.pending.set(None);
            let config = inner.config.get();
            let total = inner.total.get();
            let next = (inner.visible.get() + config.page_size).min(total);
            inner.visible.set(next);
            inner.loading.set(false);
            // Announce growth beyond the first page only.
            if next > config.page_size {
                inner
                    .announcement
                    .set(Some(format!("Loaded {next} of {total} items")));
            } else {
                inner.announcement.set(None);
            }
        });
        self.inner.pending.set(Some(handle));
        true
    }

    // =========================================================================
    // Read side
    // =========================================================================

    pub fn visible_count(&self) -> usize {
        self.inner.visible.get()
    }

    /// Reactive cursor signal.
    pub fn visible_signal(&self) -> Signal<usize> {
        self.inner.visible.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.get()
    }

    pub fn total(&self) -> usize {
        self.inner.total.get()
    }

    /// Whether the sentinel should stay mounted.
    pub fn has_more(&self) -> bool {
        self.inner.visible.get() < self.inner.total.get()
    }

    /// Skeleton placeholders to render right now.
    pub fn skeletons_to_show(&self) -> usize {
        if !self.inner.loading.get() {
            return 0;
        }
        let config = self.inner.config.get();
        config
            .skeleton_count
            .min(self.inner.total.get() - self.inner.visible.get())
    }

    /// Latest accessibility announcement, if any.
    pub fn announcement(&self) -> Option<String> {
        self.inner.announcement.get()
    }

    /// Announcement signal for live-region style consumers.
    pub fn announcement_signal(&self) -> Signal<Option<String>> {
        self.inner.announcement.clone()
    }

    /// Entrance delay for the item at `index`; zero when animation is off.
    pub fn stagger_delay_ms(&self, index: usize) -> u64 {
        let config = self.inner.config.get();
        if !config.animate_in {
            return 0;
        }
        index as u64 * config.animation_delay_step_ms
    }

    /// Disable/enable entrance animation (reduced-motion preference).
    pub fn set_animate_in(&self, animate_in: bool) {
        let mut config = self.inner.config.get();
        config.animate_in = animate_in;
        self.inner.config.set(config);
    }
}

// =============================================================================
// TESTS
// =============================================================================
