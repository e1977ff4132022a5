//! Address State - URL-synchronized filter/search state.
//!
//! The navigable address (path + query parameters) is the one piece of
//! shared state in the pipeline: filter and search state is serialized
//! into it so it survives reload and back/forward navigation.
//!
//! Rules (matching the browser-side store this replaces):
//! - Parameter writes REPLACE the current history entry. Only `navigate`
//!   pushes a new entry, so typing a query or toggling a tag never
//!   pollutes the back stack.
//! - Writing a value equal to its default (or empty) removes the
//!   parameter entirely, keeping addresses canonical and minimal.
//! - List values are comma-joined into a single parameter; parsing splits
//!   and discards empty segments. An empty list means "parameter absent".
//! - Every write is a transform over the CURRENT parameter set, never a
//!   blind overwrite, so concurrent writers to other keys are preserved.
//!
//! Single-threaded, last-writer-wins. State lives in a thread local with
//! a `reset_address_state()` escape hatch for tests.

use spark_signals::{Signal, signal};
use std::cell::RefCell;
use url::form_urlencoded;

// =============================================================================
// ADDRESS ENTRY
// =============================================================================

/// One history entry: a path plus its ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressEntry {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl AddressEntry {
    /// Parse a `path?query` string into an entry.
    pub fn parse(location: &str) -> Self {
        let (path, query) = match location.split_once('?') {
            Some((p, q)) => (p, q),
            None => (location, ""),
        };
        let params = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self {
            path: path.to_string(),
            params,
        }
    }

    /// Serialize back to a `path?query` string (no `?` when empty).
    pub fn location(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            query.append_pair(key, value);
        }
        format!("{}?{}", self.path, query.finish())
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace a key, preserving the position of an existing one.
    fn set(&mut self, key: &str, value: String) {
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
    }

    fn remove(&mut self, key: &str) {
        self.params.retain(|(k, _)| k != key);
    }
}

// =============================================================================
// HISTORY STATE
// =============================================================================

struct AddressState {
    history: Vec<AddressEntry>,
    cursor: usize,
    /// Reactive mirror of `history[cursor]`.
    current: Signal<AddressEntry>,
}

impl AddressState {
    fn new() -> Self {
        let root = AddressEntry {
            path: "/".to_string(),
            params: Vec::new(),
        };
        Self {
            history: vec![root.clone()],
            cursor: 0,
            current: signal(root),
        }
    }

    fn sync(&self) {
        self.current.set(self.history[self.cursor].clone());
    }
}

thread_local! {
    static ADDRESS: RefCell<AddressState> = RefCell::new(AddressState::new());
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// The current address entry.
pub fn current() -> AddressEntry {
    ADDRESS.with(|state| {
        let state = state.borrow();
        state.history[state.cursor].clone()
    })
}

/// Reactive signal of the current entry, for dependency tracking.
pub fn current_signal() -> Signal<AddressEntry> {
    ADDRESS.with(|state| state.borrow().current.clone())
}

/// Serialized current location (`path?query`).
pub fn location() -> String {
    current().location()
}

/// Push a new history entry for `path` (truncating any forward entries).
///
/// Query parameters do not carry over across navigation.
pub fn navigate(path: &str) {
    ADDRESS.with(|state| {
        let mut state = state.borrow_mut();
        let cursor = state.cursor;
        state.history.truncate(cursor + 1);
        state.history.push(AddressEntry {
            path: path.to_string(),
            params: Vec::new(),
        });
        state.cursor += 1;
        state.sync();
    });
}

/// Replace the whole current entry with a parsed location (reload path).
pub fn set_location(location: &str) {
    ADDRESS.with(|state| {
        let mut state = state.borrow_mut();
        let cursor = state.cursor;
        state.history[cursor] = AddressEntry::parse(location);
        state.sync();
    });
}

/// Go back one entry. Returns false at the start of history.
pub fn back() -> bool {
    ADDRESS.with(|state| {
        let mut state = state.borrow_mut();
        if state.cursor == 0 {
            return false;
        }
        state.cursor -= 1;
        state.sync();
        true
    })
}

/// Go forward one entry. Returns false at the end of history.
pub fn forward() -> bool {
    ADDRESS.with(|state| {
        let mut state = state.borrow_mut();
        if state.cursor + 1 >= state.history.len() {
            return false;
        }
        state.cursor += 1;
        state.sync();
        true
    })
}

/// Read a string parameter, falling back to `default` when absent/empty.
pub fn get(key: &str, default: &str) -> String {
    match current().get(key) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// Write a string parameter with default elision.
///
/// `value == default` or an empty value removes the parameter; otherwise
/// the parameter is set. Applied as a transform over the current set, and
/// the current history entry is REPLACED (no new back-stack entry).
pub fn set(key: &str, default: &str, value: &str) {
    ADDRESS.with(|state| {
        let mut state = state.borrow_mut();
        let cursor = state.cursor;
        let entry = &mut state.history[cursor];
        if value == default || value.is_empty() {
            entry.remove(key);
        } else {
            entry.set(key, value.to_string());
        }
        state.sync();
    });
}

/// Read a comma-joined list parameter, discarding empty segments.
pub fn get_list(key: &str) -> Vec<String> {
    match current().get(key) {
        Some(value) => value
            .split(',')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_string())
            .collect(),
        None => Vec::new(),
    }
}

/// Write a list parameter: comma-joined, removed entirely when empty.
pub fn set_list(key: &str, values: &[String]) {
    ADDRESS.with(|state| {
        let mut state = state.borrow_mut();
        let cursor = state.cursor;
        let entry = &mut state.history[cursor];
        if values.is_empty() {
            entry.remove(key);
        } else {
            entry.set(key, values.join(","));
        }
        state.sync();
    });
}

/// Toggle one value in a list parameter (the tag-chip operation).
pub fn toggle_in_list(key: &str, value: &str) {
    let mut values = get_list(key);
    match values.iter().position(|v| v == value) {
        Some(i) => {
            values.remove(i);
        }
        None => values.push(value.to_string()),
    }
    set_list(key, &values);
}

/// Reset history to a single root entry (for testing).
pub fn reset_address_state() {
    ADDRESS.with(|state| {
        *state.borrow_mut() = AddressState::new();
    });
}

// =============================================================================
// TESTS
// =============================================================================
