//! Terminal Shell - Raw-mode event loop for the browse page.
//!
//! The shell owns the terminal session and the tick loop; everything it
//! does to the page goes through [`Action`], a plain enum mapped from
//! crossterm key events. That keeps the input policy testable without a
//! terminal: tests drive `action_for` + `apply_action` directly.
//!
//! Per tick the loop:
//! 1. polls input (16ms timeout) and applies the resulting action,
//! 2. pumps the timer service with real elapsed time,
//! 3. calls [`BrowsePage::refresh`] to settle the pipeline,
//! 4. redraws via [`view::render_frame`] inside a recovery boundary.
//!
//! Keys: printable characters type into the query (Enter applies it
//! immediately, Backspace erases), Up/Down scroll, Alt+Left/Right move
//! the tag cursor, Alt+Enter toggles the tag under it, Alt+Backspace
//! clears the selection, Tab cycles the flavor, Ctrl+R toggles reduced
//! motion, Esc or Ctrl+C quits.

pub mod view;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode, size,
};
use std::cell::RefCell;
use std::io::{Write, stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::boundary::RenderBoundary;
use crate::content::ContentMeta;
use crate::monitor::ErrorMonitor;
use crate::pages::BrowsePage;
use crate::state::timers;
use crate::theme::{self, MotionPreference};

// =============================================================================
// ACTIONS
// =============================================================================

/// One shell input, decoupled from crossterm's event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Type(char),
    EraseChar,
    SubmitQuery,
    ScrollUp,
    ScrollDown,
    TagPrev,
    TagNext,
    TagToggle,
    TagsClear,
    CycleFlavor,
    ToggleMotion,
    Resize(u16, u16),
    None,
}

/// Map a crossterm event to a shell action.
pub fn action_for(event: &Event) -> Action {
    match event {
        Event::Resize(width, height) => Action::Resize(*width, *height),
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            let alt = key.modifiers.contains(KeyModifiers::ALT);
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => Action::Quit,
                KeyCode::Char('c') if ctrl => Action::Quit,
                KeyCode::Char('r') if ctrl => Action::ToggleMotion,
                KeyCode::Tab => Action::CycleFlavor,
                KeyCode::Up => Action::ScrollUp,
                KeyCode::Down => Action::ScrollDown,
                KeyCode::Left if alt => Action::TagPrev,
                KeyCode::Right if alt => Action::TagNext,
                KeyCode::Enter if alt => Action::TagToggle,
                KeyCode::Backspace if alt => Action::TagsClear,
                KeyCode::Enter => Action::SubmitQuery,
                KeyCode::Backspace => Action::EraseChar,
                KeyCode::Char(c) if !ctrl && !alt => Action::Type(c),
                _ => Action::None,
            }
        }
        _ => Action::None,
    }
}

// =============================================================================
// VIEW STATE
// =============================================================================

/// Shell-local presentation state (not part of the pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Query text as typed (the page holds the settled value).
    pub query_buffer: String,
    /// First list row currently scrolled into view.
    pub scroll_top: i32,
    /// Tag-chip cursor into the available-tags vocabulary.
    pub tag_cursor: usize,
    pub width: u16,
    pub height: u16,
}

impl ViewState {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            query_buffer: String::new(),
            scroll_top: 0,
            tag_cursor: 0,
            width,
            height,
        }
    }

    /// Rows available for the item list (header + status are fixed).
    pub fn list_height(&self) -> i32 {
        (self.height as i32 - view::CHROME_ROWS).max(1)
    }
}

/// Apply one action. Returns false when the shell should exit.
pub fn apply_action<T: ContentMeta + Clone + PartialEq + 'static>(
    page: &BrowsePage<T>,
    view: &mut ViewState,
    action: Action,
) -> bool {
    match action {
        Action::Quit => return false,
        Action::Type(c) => {
            view.query_buffer.push(c);
            page.set_query(&view.query_buffer);
        }
        Action::EraseChar => {
            view.query_buffer.pop();
            page.set_query(&view.query_buffer);
        }
        Action::SubmitQuery => page.flush_query(),
        Action::ScrollUp => view.scroll_top = (view.scroll_top - 1).max(0),
        Action::ScrollDown => view.scroll_top += 1,
        Action::TagPrev => view.tag_cursor = view.tag_cursor.saturating_sub(1),
        Action::TagNext => {
            let last = page.available_tags().len().saturating_sub(1);
            view.tag_cursor = (view.tag_cursor + 1).min(last);
        }
        Action::TagToggle => {
            if let Some(tag) = page.available_tags().get(view.tag_cursor) {
                page.toggle_tag(tag);
                view.scroll_top = 0;
            }
        }
        Action::TagsClear => {
            page.clear_tags();
            view.scroll_top = 0;
        }
        Action::CycleFlavor => {
            theme::cycle_flavor();
        }
        Action::ToggleMotion => {
            let next = match theme::motion_preference() {
                MotionPreference::Comfortable => MotionPreference::Reduced,
                MotionPreference::Reduced => MotionPreference::Comfortable,
            };
            theme::set_motion_preference(next);
        }
        Action::Resize(width, height) => {
            view.width = width;
            view.height = height;
        }
        Action::None => {}
    }

    page.fit_to_width(view.width);
    page.set_viewport(view.scroll_top, view.list_height());
    true
}

// =============================================================================
// SESSION
// =============================================================================

/// RAII raw-mode session. Restores the terminal on drop, so a panic
/// inside the loop still leaves the shell usable.
struct Session;

impl Session {
    fn enter() -> std::io::Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Run the browse experience until quit.
pub fn run<T: ContentMeta + Clone + PartialEq + 'static>(
    page: &BrowsePage<T>,
    monitor: &ErrorMonitor,
) -> std::io::Result<()> {
    let _session = Session::enter()?;
    let (width, height) = size()?;
    let mut view = ViewState::new(width, height);
    page.fit_to_width(view.width);
    page.set_viewport(view.scroll_top, view.list_height());
    info!(width, height, "shell mounted");

    // Frame data is staged here each tick; the boundary's render closure
    // reads it back, so a rendering fault degrades to a fallback frame
    // instead of tearing down the session.
    let frame: Rc<RefCell<view::FrameData>> = Rc::new(RefCell::new(view::FrameData::default()));
    let mut boundary: RenderBoundary<Vec<String>> = {
        let frame = frame.clone();
        RenderBoundary::new(
            "browse-view",
            monitor.clone(),
            move || view::render_frame(&frame.borrow()),
            |message| vec![format!("render failed: {message}"), "press any key to retry".into()],
        )
    };

    let mut last_tick = Instant::now();
    loop {
        if event::poll(Duration::from_millis(16))? {
            let action = action_for(&event::read()?);
            if !apply_action(page, &mut view, action) {
                break;
            }
            // Input re-attempts a failed subtree.
            boundary.reset();
        }

        let elapsed = last_tick.elapsed().as_millis() as u64;
        last_tick = Instant::now();
        timers::advance(elapsed);

        page.refresh();
        page.place_sentinel(page.visible_items().len() as i32);

        *frame.borrow_mut() = view::FrameData::collect(page, &view, monitor);
        let lines = boundary.render();
        draw(&lines)?;
    }

    page.teardown();
    info!("shell unmounted");
    Ok(())
}

fn draw(lines: &[String]) -> std::io::Result<()> {
    let mut out = stdout();
    execute!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in lines.iter().enumerate() {
        execute!(out, MoveTo(0, row as u16))?;
        out.write_all(line.as_bytes())?;
    }
    out.flush()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Project;
    use crate::state::address::reset_address_state;
    use crate::state::pagination::LazyListConfig;
    use crate::state::timers::{advance, reset_timer_state};
    use crate::theme::reset_theme_state;
    use crossterm::event::{KeyEvent, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn setup() -> (BrowsePage<Project>, ViewState) {
        reset_timer_state();
        reset_address_state();
        reset_theme_state();
        let page = BrowsePage::new(LazyListConfig::default(), ErrorMonitor::new());
        page.set_items(vec![
            Project {
                slug: "a".into(),
                title: "Alpha".into(),
                tags: vec!["go".into(), "react".into()],
                ..Default::default()
            },
            Project {
                slug: "b".into(),
                title: "Beta".into(),
                tags: vec!["music".into()],
                ..Default::default()
            },
        ]);
        let view = ViewState::new(120, 30);
        page.set_viewport(0, view.list_height());
        page.refresh();
        (page, view)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for(&key(KeyCode::Esc, KeyModifiers::NONE)), Action::Quit);
        assert_eq!(
            action_for(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            action_for(&key(KeyCode::Char('x'), KeyModifiers::NONE)),
            Action::Type('x')
        );
        assert_eq!(
            action_for(&key(KeyCode::Enter, KeyModifiers::ALT)),
            Action::TagToggle
        );
        assert_eq!(
            action_for(&key(KeyCode::Enter, KeyModifiers::NONE)),
            Action::SubmitQuery
        );
        assert_eq!(action_for(&key(KeyCode::Tab, KeyModifiers::NONE)), Action::CycleFlavor);
        assert_eq!(action_for(&Event::Resize(80, 24)), Action::Resize(80, 24));
    }

    #[test]
    fn test_release_events_are_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(action_for(&release), Action::None);
    }

    #[test]
    fn test_typing_feeds_debounced_query() {
        let (page, mut view) = setup();
        for c in ['b', 'e', 't'] {
            assert!(apply_action(&page, &mut view, Action::Type(c)));
        }
        assert_eq!(view.query_buffer, "bet");

        // Not yet settled.
        page.refresh();
        assert_eq!(page.filtered_count(), 2);

        advance(1_000);
        page.refresh();
        assert_eq!(page.filtered_count(), 1);
        assert_eq!(page.visible_items()[0].slug, "b");
    }

    #[test]
    fn test_submit_applies_query_immediately() {
        let (page, mut view) = setup();
        apply_action(&page, &mut view, Action::Type('a'));
        apply_action(&page, &mut view, Action::SubmitQuery);
        page.refresh();
        assert_eq!(page.query(), "a");
    }

    #[test]
    fn test_tag_cursor_and_toggle() {
        let (page, mut view) = setup();
        // Vocabulary is sorted: go, music, react.
        apply_action(&page, &mut view, Action::TagNext);
        apply_action(&page, &mut view, Action::TagToggle);
        page.refresh();

        assert_eq!(page.selected_tags(), vec!["music"]);
        assert_eq!(page.filtered_count(), 1);

        apply_action(&page, &mut view, Action::TagsClear);
        page.refresh();
        assert_eq!(page.filtered_count(), 2);
    }

    #[test]
    fn test_tag_cursor_clamps_at_ends() {
        let (page, mut view) = setup();
        apply_action(&page, &mut view, Action::TagPrev);
        assert_eq!(view.tag_cursor, 0);
        for _ in 0..10 {
            apply_action(&page, &mut view, Action::TagNext);
        }
        assert_eq!(view.tag_cursor, 2);
    }

    #[test]
    fn test_scroll_clamps_at_top() {
        let (page, mut view) = setup();
        apply_action(&page, &mut view, Action::ScrollUp);
        assert_eq!(view.scroll_top, 0);
        apply_action(&page, &mut view, Action::ScrollDown);
        assert_eq!(view.scroll_top, 1);
    }

    #[test]
    fn test_quit_action_stops_loop() {
        let (page, mut view) = setup();
        assert!(!apply_action(&page, &mut view, Action::Quit));
    }

    #[test]
    fn test_resize_updates_responsive_page_size() {
        let (page, mut view) = setup();
        apply_action(&page, &mut view, Action::Resize(60, 20));
        assert_eq!(view.width, 60);
        // Narrow layout takes effect on the next filter reset.
        page.toggle_tag("go");
        page.refresh();
        assert!(page.visible_items().len() <= 4);
    }
}
