//! Browse View - Line renderer for the terminal frame.
//!
//! Split in two halves so rendering stays testable: `FrameData::collect`
//! snapshots everything the frame needs out of the page (plain data, no
//! borrows), and `render_frame` turns a snapshot into styled lines. The
//! shell runs only the second half inside its recovery boundary.

use crossterm::style::{Color, Stylize};

use crate::content::ContentMeta;
use crate::monitor::ErrorMonitor;
use crate::pages::BrowsePage;
use crate::theme::{self, Flavor};

use super::ViewState;

/// Fixed rows around the item list: header, query, tags, rule, status.
pub const CHROME_ROWS: i32 = 5;

/// One rendered item card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardData {
    pub emoji: String,
    pub title: String,
    pub tags: Vec<String>,
    /// Entrance delay, for the stagger marker on fresh reveals.
    pub stagger_ms: u64,
}

/// Everything one frame needs, snapshotted from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameData {
    pub flavor: Flavor,
    pub query_buffer: String,
    pub settled_query: String,
    pub available_tags: Vec<String>,
    pub selected_tags: Vec<String>,
    pub tag_cursor: usize,
    pub cards: Vec<CardData>,
    pub skeletons: usize,
    pub filtered_count: usize,
    pub announcement: Option<String>,
    pub latest_error: Option<String>,
    pub is_fetching: bool,
    pub scroll_top: i32,
    pub list_height: i32,
}

impl FrameData {
    pub fn collect<T: ContentMeta + Clone + PartialEq + 'static>(
        page: &BrowsePage<T>,
        view: &ViewState,
        monitor: &ErrorMonitor,
    ) -> Self {
        let lazy = page.lazy();
        let cards = page
            .visible_items()
            .iter()
            .enumerate()
            .map(|(index, item)| CardData {
                emoji: item.emoji().unwrap_or("").to_string(),
                title: item.title().to_string(),
                tags: item.tags().to_vec(),
                stagger_ms: lazy.stagger_delay_ms(index),
            })
            .collect();

        Self {
            flavor: theme::active_flavor(),
            query_buffer: view.query_buffer.clone(),
            settled_query: page.query(),
            available_tags: page.available_tags(),
            selected_tags: page.selected_tags(),
            tag_cursor: view.tag_cursor,
            cards,
            skeletons: lazy.skeletons_to_show(),
            filtered_count: page.filtered_count(),
            announcement: lazy.announcement(),
            latest_error: monitor.latest_signal().get().map(|entry| entry.message),
            is_fetching: page.is_fetching(),
            scroll_top: view.scroll_top,
            list_height: view.list_height(),
        }
    }
}

/// Render one frame to styled lines, top to bottom.
pub fn render_frame(frame: &FrameData) -> Vec<String> {
    let (r, g, b) = frame.flavor.accent_rgb();
    let accent = Color::Rgb { r, g, b };

    let mut lines = Vec::new();
    lines.push(format!(
        "{}  {}",
        "folio".with(accent).bold(),
        format!("[{}]", frame.flavor.label()).with(accent),
    ));
    lines.push(query_line(frame));
    lines.push(tags_line(frame, accent));
    lines.push("─".repeat(40));

    let start = frame.scroll_top.max(0) as usize;
    let window = frame.list_height.max(0) as usize;
    for card in frame.cards.iter().skip(start).take(window) {
        lines.push(card_line(card, accent));
    }
    let shown = frame.cards.len().saturating_sub(start);
    for _ in 0..frame.skeletons.min(window.saturating_sub(shown)) {
        lines.push("  ░░░░░░░░░░░░░░░░░░".dim().to_string());
    }

    lines.push(status_line(frame));
    lines
}

fn query_line(frame: &FrameData) -> String {
    let pending = frame.query_buffer != frame.settled_query;
    format!(
        "query: {}{}",
        frame.query_buffer,
        if pending { "…" } else { "" }
    )
}

fn tags_line(frame: &FrameData, accent: Color) -> String {
    if frame.available_tags.is_empty() {
        return "tags: (none)".to_string();
    }
    let chips: Vec<String> = frame
        .available_tags
        .iter()
        .enumerate()
        .map(|(index, tag)| {
            let selected = frame.selected_tags.iter().any(|t| t == tag);
            let chip = if selected {
                format!("[{tag}]").with(accent).to_string()
            } else {
                tag.clone()
            };
            if index == frame.tag_cursor {
                format!(">{chip}")
            } else {
                chip
            }
        })
        .collect();
    format!("tags: {}", chips.join(" "))
}

fn card_line(card: &CardData, accent: Color) -> String {
    let mut line = String::from("  ");
    if !card.emoji.is_empty() {
        line.push_str(&card.emoji);
        line.push(' ');
    }
    line.push_str(&card.title.clone().with(accent).to_string());
    if !card.tags.is_empty() {
        line.push_str(&format!("  ({})", card.tags.join(", ")).dim().to_string());
    }
    if card.stagger_ms > 0 {
        // Entrance marker; real fade-in is not a terminal concern.
        line.push_str(&" ·".dim().to_string());
    }
    line
}

fn status_line(frame: &FrameData) -> String {
    if let Some(error) = &frame.latest_error {
        return format!("error: {error}").with(Color::Red).to_string();
    }
    if let Some(announcement) = &frame.announcement {
        return announcement.clone();
    }
    if frame.is_fetching {
        return "fetching…".to_string();
    }
    format!(
        "{} of {} items",
        frame.cards.len().min(frame.filtered_count),
        frame.filtered_count
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FrameData {
        FrameData {
            flavor: Flavor::Mocha,
            available_tags: vec!["go".into(), "music".into(), "react".into()],
            selected_tags: vec!["music".into()],
            tag_cursor: 1,
            cards: vec![
                CardData {
                    emoji: "🎮".into(),
                    title: "Twitch Chat Insights".into(),
                    tags: vec!["react".into(), "twitch".into()],
                    stagger_ms: 0,
                },
                CardData {
                    title: "Modular Synth Notes".into(),
                    stagger_ms: 100,
                    ..Default::default()
                },
            ],
            filtered_count: 8,
            list_height: 10,
            ..Default::default()
        }
    }

    fn plain(lines: &[String]) -> String {
        // Strip nothing; substring checks work through ANSI sequences.
        lines.join("\n")
    }

    #[test]
    fn test_frame_has_chrome_and_cards() {
        let lines = render_frame(&frame());
        let text = plain(&lines);
        assert!(text.contains("folio"));
        assert!(text.contains("[Mocha]"));
        assert!(text.contains("Twitch Chat Insights"));
        assert!(text.contains("Modular Synth Notes"));
        // 4 header rows + 2 cards + status.
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_selected_tag_is_bracketed_and_cursor_marked() {
        let lines = render_frame(&frame());
        let tags = &lines[2];
        assert!(tags.contains("[music]"));
        assert!(tags.contains(">"));
        assert!(!tags.contains("[go]"));
    }

    #[test]
    fn test_pending_query_shows_ellipsis() {
        let mut data = frame();
        data.query_buffer = "syn".into();
        data.settled_query = String::new();
        let lines = render_frame(&data);
        assert!(lines[1].contains("syn…"));

        data.settled_query = "syn".into();
        let lines = render_frame(&data);
        assert!(!lines[1].contains('…'));
    }

    #[test]
    fn test_skeletons_fill_loading_rows() {
        let mut data = frame();
        data.skeletons = 3;
        let lines = render_frame(&data);
        let skeleton_rows = lines.iter().filter(|l| l.contains('░')).count();
        assert_eq!(skeleton_rows, 3);
    }

    #[test]
    fn test_skeletons_capped_by_window() {
        let mut data = frame();
        data.list_height = 3;
        data.skeletons = 6;
        let lines = render_frame(&data);
        // Two cards shown, one row left in the window.
        let skeleton_rows = lines.iter().filter(|l| l.contains('░')).count();
        assert_eq!(skeleton_rows, 1);
    }

    #[test]
    fn test_scroll_window_skips_cards() {
        let mut data = frame();
        data.scroll_top = 1;
        let lines = render_frame(&data);
        let text = plain(&lines);
        assert!(!text.contains("Twitch Chat Insights"));
        assert!(text.contains("Modular Synth Notes"));
    }

    #[test]
    fn test_status_priority_error_over_announcement() {
        let mut data = frame();
        data.announcement = Some("Loading more items...".into());
        data.latest_error = Some("503".into());
        let lines = render_frame(&data);
        assert!(lines.last().unwrap().contains("error: 503"));

        data.latest_error = None;
        let lines = render_frame(&data);
        assert!(lines.last().unwrap().contains("Loading more items..."));

        data.announcement = None;
        let lines = render_frame(&data);
        assert!(lines.last().unwrap().contains("2 of 8 items"));
    }

    #[test]
    fn test_stagger_marker_only_on_delayed_cards() {
        let lines = render_frame(&frame());
        assert!(!lines[4].contains(" ·"));
        assert!(lines[5].contains(" ·"));
    }
}
