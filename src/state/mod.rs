//! State Module - Reactive stores for the content pipeline.
//!
//! Each submodule owns one concern:
//!
//! - **Timers** - deterministic single-threaded scheduler (virtual clock)
//! - **Debounce** - stable-value propagation for rapid input
//! - **Address** - URL-synchronized filter/search state with history
//! - **Visibility** - sentinel/viewport intersection sensor
//! - **Pagination** - incremental list cursor state machine
//!
//! Stores that keep thread-local state expose a `reset_*` function so
//! tests start from a clean slate.

pub mod address;
pub mod debounce;
pub mod pagination;
pub mod timers;
pub mod visibility;

pub use debounce::Debounced;
pub use pagination::{LazyList, LazyListConfig, responsive_page_size};
pub use visibility::{Margin, Viewport, VisibilitySensor};
