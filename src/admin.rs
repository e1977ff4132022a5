//! Admin Panel Store - CRUD list state with optimistic mutations.
//!
//! Headless state behind the admin screens: the record list, the draft
//! being edited, and the current error message. Mutations go through
//! caller-supplied API calls so the store itself stays synchronous and
//! testable.
//!
//! Deletion is optimistic: the record leaves the list immediately, and a
//! failed backend call restores the exact pre-mutation snapshot along
//! with an error message. Saves are pessimistic: the list only changes
//! once the backend confirms.

use spark_signals::{Signal, signal};
use tracing::warn;

use crate::api::ApiError;

/// Which slot the draft form is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(usize),
}

/// Reactive CRUD list for one record type. Clone shares state.
#[derive(Clone)]
pub struct AdminList<T: Clone + PartialEq + 'static> {
    items: Signal<Vec<T>>,
    target: Signal<EditTarget>,
    draft: Signal<T>,
    error: Signal<Option<String>>,
    empty: T,
}

impl<T: Clone + PartialEq + 'static> AdminList<T> {
    /// `empty` is the blank draft used when creating a new record.
    pub fn new(empty: T) -> Self {
        Self {
            items: signal(Vec::new()),
            target: signal(EditTarget::New),
            draft: signal(empty.clone()),
            error: signal(None),
            empty,
        }
    }

    // =========================================================================
    // Read side
    // =========================================================================

    pub fn items(&self) -> Vec<T> {
        self.items.get()
    }

    pub fn items_signal(&self) -> Signal<Vec<T>> {
        self.items.clone()
    }

    pub fn draft(&self) -> T {
        self.draft.get()
    }

    pub fn target(&self) -> EditTarget {
        self.target.get()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.target.get(), EditTarget::Existing(_))
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    // =========================================================================
    // Form state
    // =========================================================================

    /// Load the fetched record list (initial mount).
    pub fn set_items(&self, items: Vec<T>) {
        self.items.set(items);
    }

    /// Record a load failure for inline display.
    pub fn set_load_error(&self, error: &ApiError) {
        self.error.set(Some(error.to_string()));
    }

    /// Switch the form to a blank new-record draft.
    pub fn start_create(&self) {
        self.target.set(EditTarget::New);
        self.draft.set(self.empty.clone());
    }

    /// Bind the form to the record at `index`.
    pub fn start_edit(&self, index: usize) {
        let items = self.items.get();
        if let Some(item) = items.get(index) {
            self.target.set(EditTarget::Existing(index));
            self.draft.set(item.clone());
        }
    }

    /// Replace the draft (form field edits).
    pub fn set_draft(&self, draft: T) {
        self.draft.set(draft);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Optimistically remove the record at `index`, then run the backend
    /// delete. On failure the pre-mutation list is restored and the
    /// error surfaced. Editing state pointing at the removed row clears.
    pub fn remove(
        &self,
        index: usize,
        delete: impl FnOnce(&T) -> Result<(), ApiError>,
    ) -> Result<(), ApiError> {
        let snapshot = self.items.get();
        let Some(item) = snapshot.get(index).cloned() else {
            return Ok(());
        };

        let mut optimistic = snapshot.clone();
        optimistic.remove(index);
        self.items.set(optimistic);

        match delete(&item) {
            Ok(()) => {
                if self.target.get() == EditTarget::Existing(index) {
                    self.start_create();
                }
                Ok(())
            }
            Err(error) => {
                warn!(%error, "delete failed, rolling back");
                self.items.set(snapshot);
                self.error.set(Some(error.to_string()));
                Err(error)
            }
        }
    }

    /// Save the draft: create when targeting `New` (created record is
    /// prepended), update in place otherwise. Failures leave the list
    /// untouched and surface the error.
    pub fn save(
        &self,
        create: impl FnOnce(&T) -> Result<T, ApiError>,
        update: impl FnOnce(&T) -> Result<T, ApiError>,
    ) -> Result<(), ApiError> {
        self.error.set(None);
        let draft = self.draft.get();

        let outcome = match self.target.get() {
            EditTarget::New => create(&draft).map(|created| {
                let mut items = self.items.get();
                items.insert(0, created);
                self.items.set(items);
            }),
            EditTarget::Existing(index) => update(&draft).map(|updated| {
                let mut items = self.items.get();
                if index < items.len() {
                    items[index] = updated;
                }
                self.items.set(items);
            }),
        };

        match outcome {
            Ok(()) => {
                self.start_create();
                Ok(())
            }
            Err(error) => {
                self.error.set(Some(error.to_string()));
                Err(error)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
