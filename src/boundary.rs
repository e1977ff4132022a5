//! Recovery Boundary - Panic containment around a render subtree.
//!
//! Wraps a render function so a fault in one section (navigation, routed
//! content, theme control) produces that section's fallback instead of
//! taking down the whole page. Each boundary is independent: siblings
//! keep rendering. A boundary remembers its failure until `reset()`,
//! which re-attempts rendering of just that subtree, fresh.
//!
//! Every caught fault is recorded to the [`ErrorMonitor`](crate::monitor)
//! - contained never means swallowed.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::monitor::{ErrorMonitor, Severity};

/// A render subtree with fault containment.
///
/// `R` is whatever the renderer produces (lines, spans, a buffer).
pub struct RenderBoundary<R> {
    name: String,
    monitor: ErrorMonitor,
    render: Box<dyn Fn() -> R>,
    fallback: Box<dyn Fn(&str) -> R>,
    failure: Option<String>,
}

impl<R> RenderBoundary<R> {
    pub fn new(
        name: impl Into<String>,
        monitor: ErrorMonitor,
        render: impl Fn() -> R + 'static,
        fallback: impl Fn(&str) -> R + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            monitor,
            render: Box::new(render),
            fallback: Box::new(fallback),
            failure: None,
        }
    }

    /// Render the subtree, or its fallback when it has failed.
    ///
    /// A panic during rendering is caught, recorded, and replaced by the
    /// fallback; subsequent calls keep returning the fallback until
    /// `reset()`.
    pub fn render(&mut self) -> R {
        if let Some(message) = &self.failure {
            return (self.fallback)(message);
        }

        match catch_unwind(AssertUnwindSafe(|| (self.render)())) {
            Ok(output) => output,
            Err(payload) => {
                let message = panic_message(payload);
                self.monitor.record(
                    format!("boundary:{}", self.name),
                    Severity::High,
                    message.clone(),
                    None,
                );
                self.failure = Some(message.clone());
                (self.fallback)(&message)
            }
        }
    }

    /// Whether the boundary is currently showing its fallback.
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The recorded failure message, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Clear the failure and re-attempt rendering on the next call.
    pub fn reset(&mut self) {
        self.failure = None;
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "An unexpected error occurred".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
