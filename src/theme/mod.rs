//! Theme State - Catppuccin flavors and motion preference.
//!
//! The site ships four catppuccin flavors; the active one and the motion
//! preference live in thread-local reactive state so any part of the
//! shell can subscribe. Reduced motion zeroes the entrance stagger in the
//! lazy list.
//!
//! # Example
//!
//! ```rust
//! use folio_tui::theme::{self, Flavor};
//!
//! theme::set_flavor(Flavor::Latte);
//! let (r, g, b) = theme::active_flavor().accent_rgb();
//! assert_eq!((r, g, b), (0x1e, 0x66, 0xf5));
//! ```

use spark_signals::{Signal, signal};
use std::cell::RefCell;

// =============================================================================
// FLAVORS
// =============================================================================

/// A catppuccin flavor. `Mocha` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    #[default]
    Mocha,
    Macchiato,
    Frappe,
    Latte,
}

/// Cycle order for the theme toggle.
pub const FLAVOR_CYCLE: [Flavor; 4] = [
    Flavor::Mocha,
    Flavor::Macchiato,
    Flavor::Frappe,
    Flavor::Latte,
];

impl Flavor {
    /// Display label as shown in the theme picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mocha => "Mocha",
            Self::Macchiato => "Macchiato",
            Self::Frappe => "Frappé",
            Self::Latte => "Latte",
        }
    }

    /// Accent color hex, `#rrggbb`.
    pub fn accent_hex(&self) -> &'static str {
        match self {
            Self::Mocha => "#cba6f7",
            Self::Macchiato => "#8aadf4",
            Self::Frappe => "#ca9ee6",
            Self::Latte => "#1e66f5",
        }
    }

    /// Accent color as RGB components.
    pub fn accent_rgb(&self) -> (u8, u8, u8) {
        parse_hex(self.accent_hex())
    }

    /// Latte is the one light flavor.
    pub fn is_dark(&self) -> bool {
        !matches!(self, Self::Latte)
    }

    /// The next flavor in cycle order, wrapping.
    pub fn next(&self) -> Self {
        let index = FLAVOR_CYCLE
            .iter()
            .position(|f| f == self)
            .unwrap_or(0);
        FLAVOR_CYCLE[(index + 1) % FLAVOR_CYCLE.len()]
    }
}

/// Parse `#rrggbb`. Inputs here are the compile-time constants above.
fn parse_hex(hex: &str) -> (u8, u8, u8) {
    let digits = hex.trim_start_matches('#');
    let component = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    (component(0..2), component(2..4), component(4..6))
}

// =============================================================================
// MOTION PREFERENCE
// =============================================================================

/// Whether entrance animations run at full stagger or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPreference {
    #[default]
    Comfortable,
    Reduced,
}

// =============================================================================
// THEME STATE
// =============================================================================

struct ThemeState {
    flavor: Signal<Flavor>,
    motion: Signal<MotionPreference>,
}

impl ThemeState {
    fn new() -> Self {
        Self {
            flavor: signal(Flavor::default()),
            motion: signal(MotionPreference::default()),
        }
    }
}

thread_local! {
    static THEME_STATE: RefCell<ThemeState> = RefCell::new(ThemeState::new());
}

/// The active flavor.
pub fn active_flavor() -> Flavor {
    THEME_STATE.with(|state| state.borrow().flavor.get())
}

/// Reactive handle to the active flavor.
pub fn flavor_signal() -> Signal<Flavor> {
    THEME_STATE.with(|state| state.borrow().flavor.clone())
}

pub fn set_flavor(flavor: Flavor) {
    THEME_STATE.with(|state| state.borrow().flavor.set(flavor));
}

/// Advance to the next flavor in cycle order; returns the new flavor.
pub fn cycle_flavor() -> Flavor {
    THEME_STATE.with(|state| {
        let flavor = state.borrow().flavor.get().next();
        state.borrow().flavor.set(flavor);
        flavor
    })
}

pub fn motion_preference() -> MotionPreference {
    THEME_STATE.with(|state| state.borrow().motion.get())
}

/// Reactive handle to the motion preference.
pub fn motion_signal() -> Signal<MotionPreference> {
    THEME_STATE.with(|state| state.borrow().motion.clone())
}

pub fn set_motion_preference(preference: MotionPreference) {
    THEME_STATE.with(|state| state.borrow().motion.set(preference));
}

/// Reset to defaults (Mocha, comfortable motion). For tests.
pub fn reset_theme_state() {
    THEME_STATE.with(|state| {
        *state.borrow_mut() = ThemeState::new();
    });
}

// =============================================================================
// TESTS
// =============================================================================
