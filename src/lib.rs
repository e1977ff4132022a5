//! # folio-tui
//!
//! Reactive content-browsing pipeline for a personal portfolio, rendered
//! in the terminal.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals)
//! for fine-grained reactivity.
//!
//! ## Architecture
//!
//! The pipeline is a chain of small reactive stores, settled once per
//! tick by the composition root:
//! ```text
//! items + address(tags, query) → filter engine → lazy list → visible prefix
//! keystrokes → debounce → address ─┘        sentinel sensor ─┘
//! ```
//!
//! Everything upstream of the shell is headless: filtering, pagination,
//! debouncing, visibility, and embed handling are plain state machines
//! driven by a deterministic timer service, so the whole pipeline tests
//! without a terminal and without sleeping.
//!
//! ## Modules
//!
//! - [`content`] - Item records (`Project`, `Post`) and the filter engine
//! - [`state`] - Address, timers, debounce, visibility, pagination stores
//! - [`embed`] - Embed URL classification, validation, and the viewer
//! - [`api`] - Blocking HTTP CRUD client with cancelable fetches
//! - [`pages`] - The browse page composition root
//! - [`shell`] - Crossterm raw-mode event loop and line renderer

pub mod admin;
pub mod api;
pub mod boundary;
pub mod content;
pub mod embed;
pub mod monitor;
pub mod pages;
pub mod shell;
pub mod state;
pub mod theme;

// Re-export commonly used items
pub use content::{
    filter::{filter_items, matches_query, matches_tags, tag_vocabulary},
    CardColor, ContentMeta, Post, Project,
};

pub use state::{
    Debounced, LazyList, LazyListConfig, Margin, VisibilitySensor, responsive_page_size,
};

pub use embed::{
    EmbedDescriptor, EmbedUrlError, EmbedViewer, LoadState, Platform, PlatformMeta,
    SandboxPermissions, classify, embed_source, platform_meta, validate_embed_url,
};

pub use api::{ApiClient, ApiError, CancelToken, FetchHandle, spawn_fetch};

pub use admin::{AdminList, EditTarget};
pub use boundary::RenderBoundary;
pub use monitor::{ErrorEntry, ErrorMonitor, Severity, MAX_QUEUE_SIZE};
pub use pages::BrowsePage;

pub use theme::{
    Flavor, MotionPreference, active_flavor, cycle_flavor, motion_preference,
    reset_theme_state, set_flavor, set_motion_preference,
};
