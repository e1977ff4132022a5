//! Visibility Sensor - Sentinel/viewport intersection.
//!
//! Detects when a sentinel row enters the visible window, optionally
//! expanded by a margin so content can be detected slightly before (or
//! after) it is geometrically visible. This is the growth trigger for the
//! incremental list renderer: the sentinel sits just past the last
//! rendered item, and scrolling it into view requests the next page.
//!
//! The margin is accepted as a string (`"40"`, `"-20px"`, `"15%"`) and
//! validated against a strict pattern; anything invalid falls back to
//! `0px` rather than failing. In the terminal, "px" means rows.
//!
//! At most one sentinel is observed at a time; `disconnect` drops the
//! observation so an unmounted sentinel can never fire.

use spark_signals::{Signal, signal};

// =============================================================================
// MARGIN
// =============================================================================

/// Offset applied to both edges of the viewport before intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Margin {
    /// Absolute rows ("px" or unitless).
    Cells(i32),
    /// Percentage of the viewport height.
    Percent(i32),
}

impl Margin {
    /// Parse a margin string, strictly: `-?digits(px|%)?`.
    ///
    /// Invalid input yields `Cells(0)` - the sensor must never crash on a
    /// bad margin, it just observes without an offset.
    pub fn parse(input: &str) -> Self {
        let (number, percent) = match input.strip_suffix("px") {
            Some(n) => (n, false),
            None => match input.strip_suffix('%') {
                Some(n) => (n, true),
                None => (input, false),
            },
        };

        let digits = number.strip_prefix('-').unwrap_or(number);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Margin::Cells(0);
        }

        match number.parse::<i32>() {
            Ok(value) if percent => Margin::Percent(value),
            Ok(value) => Margin::Cells(value),
            Err(_) => Margin::Cells(0),
        }
    }

    /// Resolve to rows for a given viewport height.
    pub fn resolve(&self, viewport_height: i32) -> i32 {
        match self {
            Margin::Cells(rows) => *rows,
            Margin::Percent(pct) => viewport_height * pct / 100,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Cells(0)
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// The visible row window: `top` is the first visible content row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub top: i32,
    pub height: i32,
}

// =============================================================================
// SENSOR
// =============================================================================

/// Observes one sentinel row against the (margin-adjusted) viewport.
///
/// Clone shares the same observation state. The visibility flag is
/// transient UI state and is never persisted.
#[derive(Clone)]
pub struct VisibilitySensor {
    margin: Margin,
    viewport: Signal<Viewport>,
    sentinel: Signal<Option<i32>>,
}

impl VisibilitySensor {
    /// Create a sensor with a margin string (see [`Margin::parse`]).
    pub fn new(margin: &str) -> Self {
        Self {
            margin: Margin::parse(margin),
            viewport: signal(Viewport::default()),
            sentinel: signal(None),
        }
    }

    /// The parsed margin (mainly for diagnostics).
    pub fn margin(&self) -> Margin {
        self.margin
    }

    /// Replace the margin. This is a re-subscription: the previous
    /// observation is dropped and a fresh sensor is returned.
    pub fn with_margin(&self, margin: &str) -> Self {
        self.sentinel.set(None);
        Self::new(margin)
    }

    /// Update the visible window (scroll or resize).
    pub fn set_viewport(&self, top: i32, height: i32) {
        self.viewport.set(Viewport { top, height });
    }

    /// Attach the sentinel at a content row. Replaces any previous one -
    /// only a single element is ever observed.
    pub fn observe(&self, row: i32) {
        self.sentinel.set(Some(row));
    }

    /// Drop the observation (unmount). A disconnected sensor reports
    /// not-visible and holds no platform resources.
    pub fn disconnect(&self) {
        self.sentinel.set(None);
    }

    /// Whether anything is currently observed.
    pub fn is_observing(&self) -> bool {
        self.sentinel.get().is_some()
    }

    /// Whether the sentinel intersects the margin-adjusted viewport.
    ///
    /// Reads the viewport and sentinel signals, so calling this inside a
    /// derived or effect creates reactive dependencies on both.
    pub fn is_visible(&self) -> bool {
        let Some(row) = self.sentinel.get() else {
            return false;
        };
        let viewport = self.viewport.get();
        if viewport.height <= 0 {
            return false;
        }
        let margin = self.margin.resolve(viewport.height);
        row >= viewport.top - margin && row < viewport.top + viewport.height + margin
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_parse_valid_forms() {
        assert_eq!(Margin::parse("0px"), Margin::Cells(0));
        assert_eq!(Margin::parse("40"), Margin::Cells(40));
        assert_eq!(Margin::parse("-20px"), Margin::Cells(-20));
        assert_eq!(Margin::parse("15%"), Margin::Percent(15));
        assert_eq!(Margin::parse("-10%"), Margin::Percent(-10));
    }

    #[test]
    fn test_margin_parse_invalid_falls_back() {
        assert_eq!(Margin::parse(""), Margin::Cells(0));
        assert_eq!(Margin::parse("abc"), Margin::Cells(0));
        assert_eq!(Margin::parse("10pxx"), Margin::Cells(0));
        assert_eq!(Margin::parse("--5"), Margin::Cells(0));
        assert_eq!(Margin::parse("5 %"), Margin::Cells(0));
    }

    #[test]
    fn test_margin_resolve_percent() {
        assert_eq!(Margin::Percent(50).resolve(20), 10);
        assert_eq!(Margin::Percent(-25).resolve(20), -5);
        assert_eq!(Margin::Cells(3).resolve(20), 3);
    }

    #[test]
    fn test_sentinel_flips_with_scroll() {
        let sensor = VisibilitySensor::new("0px");
        sensor.set_viewport(0, 10);
        sensor.observe(25);
        assert!(!sensor.is_visible());

        // Scroll down until row 25 enters the window.
        sensor.set_viewport(20, 10);
        assert!(sensor.is_visible());

        // And leaves it again.
        sensor.set_viewport(30, 10);
        assert!(!sensor.is_visible());
    }

    #[test]
    fn test_negative_margin_shrinks_window() {
        let sensor = VisibilitySensor::new("-2px");
        sensor.set_viewport(0, 10);

        // Row 9 is inside the raw window but outside the shrunk one.
        sensor.observe(9);
        assert!(!sensor.is_visible());

        sensor.observe(7);
        assert!(sensor.is_visible());
    }

    #[test]
    fn test_percent_margin_extends_window() {
        let sensor = VisibilitySensor::new("50%");
        sensor.set_viewport(0, 10);

        // Row 14 is 4 past the bottom, within the 5-row extension.
        sensor.observe(14);
        assert!(sensor.is_visible());

        sensor.observe(15);
        assert!(!sensor.is_visible());
    }

    #[test]
    fn test_disconnect_stops_reporting() {
        let sensor = VisibilitySensor::new("0px");
        sensor.set_viewport(0, 10);
        sensor.observe(5);
        assert!(sensor.is_visible());

        sensor.disconnect();
        assert!(!sensor.is_visible());
        assert!(!sensor.is_observing());
    }

    #[test]
    fn test_empty_viewport_never_visible() {
        let sensor = VisibilitySensor::new("0px");
        sensor.observe(0);
        assert!(!sensor.is_visible());
    }

    #[test]
    fn test_with_margin_resubscribes_fresh() {
        let sensor = VisibilitySensor::new("0px");
        sensor.set_viewport(0, 10);
        sensor.observe(5);

        let wider = sensor.with_margin("20px");
        // Old observation does not carry over.
        assert!(!sensor.is_observing());
        assert!(!wider.is_observing());
        assert_eq!(wider.margin(), Margin::Cells(20));
    }
}
