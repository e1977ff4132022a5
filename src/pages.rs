//! Browse Page - Composition root for the content pipeline.
//!
//! Wires the stores together for one browsable collection:
//!
//! ```text
//! items ──┐
//! address (tags, query) ──> filter engine ──> lazy list ──> visible prefix
//! keystrokes ──> debounce ──> address ─┘          ^
//!                              sentinel sensor ───┘
//! ```
//!
//! The page is pull-based: the shell calls [`BrowsePage::refresh`] once
//! per tick (after pumping timers) and the page settles everything that
//! changed since - applies a finished fetch, writes the settled query to
//! the address, recomputes the filtered subset when the filter identity
//! moved, and polls the sentinel for growth. Filter identity is the
//! `(selected_tags, settled_query)` pair; any change resets the lazy
//! cursor before rendering, so a stale cursor never outlives the
//! collection it indexed.

use spark_signals::{Signal, signal};
use std::cell::RefCell;

use crate::api::FetchHandle;
use crate::content::filter::{filter_items, tag_vocabulary};
use crate::content::ContentMeta;
use crate::monitor::{ErrorMonitor, Severity};
use crate::state::address;
use crate::state::debounce::Debounced;
use crate::state::pagination::{LazyList, LazyListConfig, responsive_page_size};
use crate::state::visibility::VisibilitySensor;
use crate::theme::{self, MotionPreference};

/// Address parameter keys for the browse filter state.
const PARAM_TAGS: &str = "tags";
const PARAM_QUERY: &str = "query";

/// Keystroke-to-filter settle delay.
const QUERY_DEBOUNCE_MS: u64 = 300;

/// One browsable, filterable, lazily revealed collection.
pub struct BrowsePage<T: ContentMeta + Clone + PartialEq + 'static> {
    items: Signal<Vec<T>>,
    query_input: Debounced<String>,
    last_settled: RefCell<String>,
    lazy: LazyList,
    sensor: VisibilitySensor,
    monitor: ErrorMonitor,
    /// Filter identity the cached subset was computed for.
    applied: RefCell<Option<(Vec<String>, String)>>,
    filtered: RefCell<Vec<T>>,
    fetch: RefCell<Option<FetchHandle<Vec<T>>>>,
}

impl<T: ContentMeta + Clone + PartialEq + 'static> BrowsePage<T> {
    /// Build a page over an (initially empty) collection. Filter state is
    /// seeded from the current address, so a reloaded or back-navigated
    /// location reproduces its filter.
    pub fn new(config: LazyListConfig, monitor: ErrorMonitor) -> Self {
        let initial_query = address::get(PARAM_QUERY, "");
        Self {
            items: signal(Vec::new()),
            query_input: Debounced::new(initial_query.clone(), QUERY_DEBOUNCE_MS),
            last_settled: RefCell::new(initial_query),
            lazy: LazyList::new(config),
            sensor: VisibilitySensor::new("100px"),
            monitor,
            applied: RefCell::new(None),
            filtered: RefCell::new(Vec::new()),
            fetch: RefCell::new(None),
        }
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Replace the raw collection (local data path).
    ///
    /// A new collection is a new filter identity: the cached subset is
    /// invalidated so the next `refresh` recomputes against it.
    pub fn set_items(&self, items: Vec<T>) {
        self.items.set(items);
        *self.applied.borrow_mut() = None;
    }

    /// Adopt a background fetch; its result is applied on a later
    /// `refresh`. A previous in-flight fetch is canceled first, so a
    /// superseded response can never be applied.
    pub fn load_from(&self, handle: FetchHandle<Vec<T>>) {
        if let Some(previous) = self.fetch.borrow_mut().take() {
            previous.token().cancel();
        }
        *self.fetch.borrow_mut() = Some(handle);
    }

    /// Feed one keystroke's worth of query text.
    pub fn set_query(&self, text: &str) {
        self.query_input.feed(text.to_string());
    }

    /// Apply pending query text immediately (Enter key).
    pub fn flush_query(&self) {
        self.query_input.flush();
    }

    /// Toggle a tag chip. Applied to the address immediately; the filter
    /// follows on the next `refresh`.
    pub fn toggle_tag(&self, tag: &str) {
        address::toggle_in_list(PARAM_TAGS, tag);
    }

    pub fn clear_tags(&self) {
        address::set_list(PARAM_TAGS, &[]);
    }

    /// Update the sensor's visible row window (scroll or resize). The
    /// configured page size is left alone; shells that want width-based
    /// sizing call [`fit_to_width`](Self::fit_to_width) as well.
    pub fn set_viewport(&self, top: i32, height: i32) {
        self.sensor.set_viewport(top, height);
    }

    /// Opt-in responsive sizing: derive the page size from the terminal
    /// width (narrow 4 / medium 6 / wide 9).
    pub fn fit_to_width(&self, width: u16) {
        self.lazy.set_page_size(responsive_page_size(width));
    }

    /// Place the end-of-list sentinel at `row`, or unmount it once the
    /// collection is exhausted.
    pub fn place_sentinel(&self, row: i32) {
        if self.lazy.has_more() {
            self.sensor.observe(row);
        } else {
            self.sensor.disconnect();
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Settle the pipeline. Call once per tick, after pumping timers.
    pub fn refresh(&self) {
        self.apply_fetch();
        self.sync_query_to_address();
        self.apply_motion_preference();

        let identity = (address::get_list(PARAM_TAGS), address::get(PARAM_QUERY, ""));
        let stale = self.applied.borrow().as_ref() != Some(&identity);
        if stale {
            let items = self.items.get();
            let subset: Vec<T> = filter_items(&items, &identity.0, &identity.1)
                .into_iter()
                .cloned()
                .collect();
            self.lazy.reset(subset.len());
            *self.filtered.borrow_mut() = subset;
            *self.applied.borrow_mut() = Some(identity);
        }

        self.lazy.poll(&self.sensor);
    }

    fn apply_fetch(&self) {
        let result = match self.fetch.borrow().as_ref() {
            Some(handle) => handle.poll(),
            None => return,
        };
        match result {
            Some(Ok(items)) => {
                self.items.set(items);
                // Force a recompute against the new collection.
                *self.applied.borrow_mut() = None;
                *self.fetch.borrow_mut() = None;
            }
            Some(Err(error)) => {
                self.monitor
                    .record("browse:fetch", Severity::High, error.to_string(), None);
                *self.fetch.borrow_mut() = None;
            }
            None => {}
        }
    }

    /// Write the settled query into the address, once per settled value.
    ///
    /// Guarded on change so an address restored by back/forward is not
    /// clobbered by an old settled value.
    fn sync_query_to_address(&self) {
        let settled = self.query_input.get();
        if *self.last_settled.borrow() != settled {
            address::set(PARAM_QUERY, "", &settled);
            *self.last_settled.borrow_mut() = settled;
        }
    }

    fn apply_motion_preference(&self) {
        self.lazy
            .set_animate_in(theme::motion_preference() == MotionPreference::Comfortable);
    }

    // =========================================================================
    // Read side
    // =========================================================================

    /// The visible prefix of the filtered collection, in input order.
    pub fn visible_items(&self) -> Vec<T> {
        let filtered = self.filtered.borrow();
        let visible = self.lazy.visible_count().min(filtered.len());
        filtered[..visible].to_vec()
    }

    /// Size of the whole filtered collection (not just the prefix).
    pub fn filtered_count(&self) -> usize {
        self.filtered.borrow().len()
    }

    pub fn selected_tags(&self) -> Vec<String> {
        address::get_list(PARAM_TAGS)
    }

    pub fn query(&self) -> String {
        address::get(PARAM_QUERY, "")
    }

    /// Tag vocabulary over the raw (unfiltered) collection.
    pub fn available_tags(&self) -> Vec<String> {
        tag_vocabulary(&self.items.get())
    }

    pub fn lazy(&self) -> &LazyList {
        &self.lazy
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch.borrow().is_some()
    }

    /// Most recent fetch failure lives in the monitor; convenience check.
    pub fn last_error(&self) -> Option<String> {
        self.monitor
            .latest_signal()
            .get()
            .map(|entry| entry.message)
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Unmount: drop the pending query sample, the sentinel subscription,
    /// and any in-flight fetch. A late response after this never lands.
    pub fn teardown(&self) {
        self.query_input.cancel();
        self.sensor.disconnect();
        if let Some(handle) = self.fetch.borrow_mut().take() {
            handle.token().cancel();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, CancelToken, spawn_fetch};
    use crate::content::Project;
    use crate::state::address::reset_address_state;
    use crate::state::timers::{advance, reset_timer_state};
    use crate::theme::reset_theme_state;
    use std::thread;
    use std::time::Duration;

    fn project(slug: &str, title: &str, tags: &[&str]) -> Project {
        Project {
            slug: slug.into(),
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn catalog() -> Vec<Project> {
        vec![
            project("chat", "Twitch Chat Insights", &["react", "twitch"]),
            project("folio", "Portfolio Site", &["react", "go"]),
            project("synth", "Modular Synth Notes", &["music"]),
            project("bot", "Chat Bot", &["twitch", "go"]),
            project("viz", "Audio Visualizer", &["music", "react"]),
        ]
    }

    fn setup(page_size: usize) -> BrowsePage<Project> {
        reset_timer_state();
        reset_address_state();
        reset_theme_state();
        let page = BrowsePage::new(
            LazyListConfig {
                page_size,
                growth_delay_ms: 150,
                ..Default::default()
            },
            ErrorMonitor::new(),
        );
        page.set_items(catalog());
        page.set_viewport(0, 20);
        page.refresh();
        page
    }

    #[test]
    fn test_initial_refresh_shows_first_page() {
        let page = setup(2);
        assert_eq!(page.filtered_count(), 5);
        let visible: Vec<String> = page.visible_items().iter().map(|p| p.slug.clone()).collect();
        assert_eq!(visible, vec!["chat", "folio"]);
    }

    #[test]
    fn test_replacing_items_mid_session_updates_view() {
        let page = setup(9);
        assert_eq!(page.filtered_count(), 5);

        // Same tags/query, new collection: the view must follow it.
        page.set_items(vec![project("solo", "Only Item", &["solo"])]);
        page.refresh();
        assert_eq!(page.filtered_count(), 1);
        assert_eq!(page.visible_items()[0].slug, "solo");
    }

    #[test]
    fn test_set_viewport_keeps_configured_page_size() {
        let page = setup(2);
        page.set_viewport(0, 40);
        page.toggle_tag("react");
        page.refresh();
        // Reset uses the configured size, not a width-derived one.
        assert_eq!(page.visible_items().len(), 2);

        // Responsive sizing only applies when asked for.
        page.fit_to_width(60);
        page.clear_tags();
        page.refresh();
        assert_eq!(page.visible_items().len(), 4);
    }

    #[test]
    fn test_sentinel_drives_growth() {
        let page = setup(2);
        page.place_sentinel(5);

        page.refresh();
        assert!(page.lazy().is_loading());
        advance(150);
        page.refresh();

        assert_eq!(page.visible_items().len(), 4);
    }

    #[test]
    fn test_sentinel_unmounts_when_exhausted() {
        let page = setup(9);
        page.place_sentinel(5);
        page.refresh();

        // Whole collection visible on the first page.
        assert_eq!(page.visible_items().len(), 5);
        advance(1_000);
        page.refresh();
        assert_eq!(page.visible_items().len(), 5);
    }

    #[test]
    fn test_debounced_query_settles_into_address_once() {
        let page = setup(9);
        page.set_query("t");
        page.set_query("tw");
        page.set_query("twitch");

        // Still unsettled: address and filter unchanged.
        page.refresh();
        assert_eq!(page.query(), "");
        assert_eq!(page.filtered_count(), 5);

        advance(QUERY_DEBOUNCE_MS);
        page.refresh();
        assert_eq!(page.query(), "twitch");
        let visible: Vec<String> = page.visible_items().iter().map(|p| p.slug.clone()).collect();
        assert_eq!(visible, vec!["chat", "bot"]);
    }

    #[test]
    fn test_tag_selection_is_and_semantics() {
        let page = setup(9);
        page.toggle_tag("react");
        page.refresh();
        assert_eq!(page.filtered_count(), 3);

        page.toggle_tag("twitch");
        page.refresh();
        let visible: Vec<String> = page.visible_items().iter().map(|p| p.slug.clone()).collect();
        assert_eq!(visible, vec!["chat"]);

        page.clear_tags();
        page.refresh();
        assert_eq!(page.filtered_count(), 5);
    }

    #[test]
    fn test_filter_change_resets_cursor() {
        let page = setup(2);
        page.place_sentinel(5);
        page.refresh();
        advance(150);
        page.refresh();
        assert_eq!(page.visible_items().len(), 4);

        // Narrowing the filter starts the reveal over.
        page.toggle_tag("music");
        page.refresh();
        assert_eq!(page.filtered_count(), 2);
        assert_eq!(page.visible_items().len(), 2);
        assert!(!page.lazy().is_loading());
    }

    #[test]
    fn test_stale_tag_matches_nothing() {
        let page = setup(9);
        page.toggle_tag("haskell");
        page.refresh();
        assert_eq!(page.filtered_count(), 0);
        assert!(page.visible_items().is_empty());
    }

    #[test]
    fn test_filter_state_survives_address_roundtrip() {
        let page = setup(9);
        page.toggle_tag("go");
        page.set_query("chat");
        advance(QUERY_DEBOUNCE_MS);
        page.refresh();
        let before: Vec<String> = page.visible_items().iter().map(|p| p.slug.clone()).collect();
        assert_eq!(before, vec!["bot"]);

        // Reload: a fresh page over the same address reproduces the view.
        let saved = address::location();
        reset_timer_state();
        reset_address_state();
        address::set_location(&saved);

        let reloaded = BrowsePage::new(LazyListConfig::default(), ErrorMonitor::new());
        reloaded.set_items(catalog());
        reloaded.refresh();
        let after: Vec<String> = reloaded
            .visible_items()
            .iter()
            .map(|p| p.slug.clone())
            .collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_reduced_motion_zeroes_stagger() {
        let page = setup(9);
        assert_eq!(page.lazy().stagger_delay_ms(3), 300);

        theme::set_motion_preference(MotionPreference::Reduced);
        page.refresh();
        assert_eq!(page.lazy().stagger_delay_ms(3), 0);
    }

    #[test]
    fn test_fetch_result_applied_on_refresh() {
        let page = setup(9);
        let handle = spawn_fetch(CancelToken::new(), || {
            Ok(vec![project("only", "Only Item", &["solo"])])
        });
        page.load_from(handle);

        for _ in 0..100 {
            page.refresh();
            if !page.is_fetching() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(page.filtered_count(), 1);
        assert_eq!(page.visible_items()[0].slug, "only");
    }

    #[test]
    fn test_teardown_discards_late_fetch() {
        let page = setup(9);
        let handle = spawn_fetch(CancelToken::new(), || {
            Ok(vec![project("late", "Late", &[])])
        });
        page.load_from(handle);
        page.teardown();

        thread::sleep(Duration::from_millis(50));
        page.refresh();
        // Original collection untouched.
        assert_eq!(page.filtered_count(), 5);
    }

    #[test]
    fn test_fetch_error_lands_in_monitor() {
        let page = setup(9);
        let handle = spawn_fetch(CancelToken::new(), || {
            Err::<Vec<Project>, _>(ApiError::Status("503 Service Unavailable".into()))
        });
        page.load_from(handle);

        for _ in 0..100 {
            page.refresh();
            if !page.is_fetching() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(
            page.last_error().as_deref(),
            Some("503 Service Unavailable")
        );
        assert_eq!(page.filtered_count(), 5);
    }
}
