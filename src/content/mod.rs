//! Content Model - Items flowing through the pipeline.
//!
//! The pipeline is generic over the item type: anything implementing
//! [`ContentMeta`] can be filtered, paginated, and rendered. Two concrete
//! record types mirror the backend JSON shapes:
//! - [`Project`] - portfolio project cards
//! - [`Post`] - blog post metadata
//!
//! Items are owned by the page that fetched (or embedded) them. The
//! pipeline only reads; it never mutates an item.

use serde::{Deserialize, Serialize};

pub mod filter;

pub use filter::{filter_items, matches_query, matches_tags, tag_vocabulary};

// =============================================================================
// ContentMeta - The fields the pipeline reads
// =============================================================================

/// Read-only view of the fields used for filtering and display.
///
/// `slug()` is the stable unique identifier, used as the render key.
/// Everything else is optional except the title. Tag display order is
/// preserved; matching does not depend on order.
pub trait ContentMeta {
    /// Stable unique identifier.
    fn slug(&self) -> &str;
    /// Display title.
    fn title(&self) -> &str;
    /// Short one-line summary, if any.
    fn summary(&self) -> Option<&str>;
    /// Tags in display order.
    fn tags(&self) -> &[String];
    /// Emoji/short-label field, if any. Participates in query matching.
    fn emoji(&self) -> Option<&str> {
        None
    }
    /// Publication date (ISO string), if any.
    fn date(&self) -> Option<&str> {
        None
    }
}

// =============================================================================
// Project
// =============================================================================

/// Accent color a project card can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Green,
    Pink,
    Cyan,
    Yellow,
}

/// A portfolio project record as served by `/api/projects`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CardColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Long-form body used by the detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Third-party media URL rendered through the embed pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Project {
    /// Internal or external link target for the card.
    ///
    /// Falls back to the detail route when no explicit href is set.
    pub fn link(&self) -> String {
        match &self.href {
            Some(href) => href.clone(),
            None => format!("/projects/{}", self.slug),
        }
    }
}

impl ContentMeta for Project {
    fn slug(&self) -> &str {
        &self.slug
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn emoji(&self) -> Option<&str> {
        self.emoji.as_deref()
    }
    fn date(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

// =============================================================================
// Post
// =============================================================================

/// A blog post record as served by `/api/posts`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ContentMeta for Post {
    fn slug(&self) -> &str {
        &self.slug
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn date(&self) -> Option<&str> {
        self.date.as_deref().or(self.created_at.as_deref())
    }
}

// =============================================================================
// Tests
// =============================================================================
