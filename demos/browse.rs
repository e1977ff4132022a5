//! Browse demo: the full pipeline in a terminal.
//!
//! Runs against bundled sample projects by default. Point it at a live
//! backend with `FOLIO_API=http://localhost:8080/api` to fetch the real
//! project list instead (falling back to the samples on error, with the
//! failure surfaced in the status line).
//!
//! ```sh
//! cargo run --example browse
//! ```
//!
//! Keys: type to search, Enter applies, Up/Down scroll, Alt+Left/Right
//! move the tag cursor, Alt+Enter toggles a tag, Tab cycles the flavor,
//! Esc quits.

use folio_tui::api::{ApiClient, CancelToken, spawn_fetch};
use folio_tui::monitor::ErrorMonitor;
use folio_tui::pages::BrowsePage;
use folio_tui::shell;
use folio_tui::state::LazyListConfig;
use folio_tui::Project;
use tracing_subscriber::EnvFilter;

fn sample_projects() -> Vec<Project> {
    let tagged = |slug: &str, title: &str, emoji: &str, tags: &[&str]| Project {
        slug: slug.into(),
        title: title.into(),
        emoji: Some(emoji.into()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    };
    vec![
        tagged("chat-insights", "Twitch Chat Insights", "🎮", &["react", "twitch", "go"]),
        tagged("folio", "Portfolio Site", "🗂️", &["react", "go", "postgres"]),
        tagged("synth-notes", "Modular Synth Notes", "🎛️", &["music", "mdx"]),
        tagged("overlay-bot", "Stream Overlay Bot", "🤖", &["twitch", "go"]),
        tagged("audio-viz", "Audio Visualizer", "🌈", &["music", "react"]),
        tagged("clip-archive", "Clip Archive", "🎬", &["twitch", "postgres"]),
        tagged("pedal-log", "Pedalboard Log", "🎸", &["music"]),
        tagged("uses", "Uses Page", "🧰", &["mdx"]),
        tagged("now", "Now Page", "⏳", &["mdx"]),
        tagged("blogster", "Blog Engine", "✍️", &["go", "postgres"]),
        tagged("chip8", "CHIP-8 Emulator", "👾", &["rust"]),
        tagged("dotfiles", "Dotfiles", "📁", &["shell"]),
    ]
}

fn main() -> std::io::Result<()> {
    // Log to stderr; the alternate screen owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let monitor = ErrorMonitor::new();
    let page = BrowsePage::new(LazyListConfig::default(), monitor.clone());
    page.set_items(sample_projects());

    if let Ok(base) = std::env::var("FOLIO_API") {
        match ApiClient::new(&base) {
            Ok(client) => {
                page.load_from(spawn_fetch(CancelToken::new(), move || {
                    client.list_projects()
                }));
            }
            Err(error) => eprintln!("ignoring FOLIO_API: {error}"),
        }
    }

    shell::run(&page, &monitor)
}
