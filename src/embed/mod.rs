//! Resilient Embed Renderer - Third-party media, never trusted.
//!
//! Classifies an arbitrary URL into a closed set of known platforms and
//! produces the embeddable source for recognized ones. Everything else -
//! unknown platforms, malformed URLs, URLs failing validation - degrades
//! to a fallback card with a direct outbound link. A raw frame is never
//! rendered for an unrecognized origin; that is a deliberate security
//! boundary, not a missing feature.
//!
//! Classification is purely syntactic (substring matching against known
//! domains) in a fixed priority order; the first match wins.

use thiserror::Error;
use url::Url;

mod viewer;

pub use viewer::{EmbedViewer, LoadState, SandboxPermissions};

// =============================================================================
// DESCRIPTOR + PLATFORM
// =============================================================================

/// An embed request: a URL and an optional display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedDescriptor {
    pub url: String,
    pub title: Option<String>,
}

impl EmbedDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    pub fn with_title(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: Some(title.into()),
        }
    }
}

/// The closed set of embeddable platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Spotify,
    SoundCloud,
    Twitch,
    Bandcamp,
    Unsupported,
}

/// Classify a URL by domain substring, in fixed priority order.
pub fn classify(url: &str) -> Platform {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        Platform::YouTube
    } else if url.contains("spotify.com") {
        Platform::Spotify
    } else if url.contains("soundcloud.com") {
        Platform::SoundCloud
    } else if url.contains("twitch.tv") {
        Platform::Twitch
    } else if url.contains("bandcamp.com") {
        Platform::Bandcamp
    } else {
        Platform::Unsupported
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Why a URL was rejected before any embedding was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedUrlError {
    #[error("URL is required")]
    Empty,
    #[error("invalid URL format")]
    Malformed,
    #[error("URL must use HTTP or HTTPS protocol")]
    Scheme,
    #[error("localhost URLs are not allowed in production")]
    LocalhostInProduction,
}

/// Validate an embed URL: absolute, http/https only; production builds
/// additionally reject `localhost` hosts regardless of platform match.
pub fn validate_embed_url(url: &str, production: bool) -> Result<(), EmbedUrlError> {
    if url.is_empty() {
        return Err(EmbedUrlError::Empty);
    }
    let parsed = Url::parse(url).map_err(|_| EmbedUrlError::Malformed)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(EmbedUrlError::Scheme);
    }
    if production && parsed.host_str() == Some("localhost") {
        return Err(EmbedUrlError::LocalhostInProduction);
    }
    Ok(())
}

// =============================================================================
// EMBED SOURCE
// =============================================================================

/// Platform-specific embeddable URL form.
///
/// Twitch needs the channel name extracted into the player URL; a URL
/// without one gets no source (fallback card). Other recognized
/// platforms pass the URL through unmodified.
pub fn embed_source(url: &str) -> Option<String> {
    match classify(url) {
        Platform::Twitch => twitch_channel(url)
            .map(|channel| format!("https://player.twitch.tv/?channel={channel}&parent=localhost")),
        Platform::Unsupported => None,
        _ => Some(url.to_string()),
    }
}

/// Extract the channel segment from a `twitch.tv/<channel>` URL.
///
/// Channel names are alphanumerics and underscores; anything else ends
/// the match. Returns None for bare `twitch.tv` links.
pub fn twitch_channel(url: &str) -> Option<&str> {
    let rest = url.split_once("twitch.tv/").map(|(_, rest)| rest)?;
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(rest.len());
    if end == 0 { None } else { Some(&rest[..end]) }
}

// =============================================================================
// FALLBACK META
// =============================================================================

/// Label and glyph for the fallback card of a non-embeddable link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformMeta {
    pub name: &'static str,
    pub emoji: &'static str,
}

/// Best-effort platform identity for the fallback card, covering
/// services that are recognized but never embedded.
pub fn platform_meta(url: &str) -> PlatformMeta {
    const KNOWN: [(&str, PlatformMeta); 6] = [
        ("twitter.com", PlatformMeta { name: "Twitter", emoji: "🐦" }),
        ("bsky.app", PlatformMeta { name: "Bluesky", emoji: "🟦" }),
        ("instagram.com", PlatformMeta { name: "Instagram", emoji: "📸" }),
        ("tiktok.com", PlatformMeta { name: "TikTok", emoji: "🎵" }),
        ("bandcamp.com", PlatformMeta { name: "Bandcamp", emoji: "🎶" }),
        ("twitch.tv", PlatformMeta { name: "Twitch", emoji: "🟣" }),
    ];
    for (domain, meta) in KNOWN {
        if url.contains(domain) {
            return meta;
        }
    }
    PlatformMeta {
        name: "Link",
        emoji: "🔗",
    }
}

// =============================================================================
// TESTS
// =============================================================================
