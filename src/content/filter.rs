//! Filter/Search Engine - Pure subset computation.
//!
//! Given the raw item collection plus the current tag selection and query
//! string, computes the visible subset. Stateless and order-stable: the
//! result preserves input order, there is no ranking.
//!
//! Semantics:
//! - Tag matching is logical AND across all selected tags. An item must
//!   carry every selected tag, not just one.
//! - Query matching is case-insensitive substring, OR across title,
//!   summary, any tag, and the emoji/short-label field.
//! - Empty query matches everything; empty tag selection matches
//!   everything (vacuous AND).

use super::ContentMeta;

/// Check the AND tag predicate: every selected tag must be on the item.
///
/// Stale tags (no longer present on any item) simply match nothing.
pub fn matches_tags<T: ContentMeta>(item: &T, selected: &[String]) -> bool {
    selected
        .iter()
        .all(|tag| item.tags().iter().any(|t| t == tag))
}

/// Check the case-insensitive OR-across-fields query predicate.
pub fn matches_query<T: ContentMeta>(item: &T, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();

    let contains = |field: &str| field.to_lowercase().contains(&needle);

    contains(item.title())
        || item.summary().is_some_and(contains)
        || item.tags().iter().any(|tag| contains(tag))
        || item.emoji().is_some_and(contains)
}

/// Compute the visible subset. Stable filter, not a sort.
pub fn filter_items<'a, T: ContentMeta>(
    items: &'a [T],
    selected_tags: &[String],
    query: &str,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches_tags(*item, selected_tags) && matches_query(*item, query))
        .collect()
}

/// Sorted, deduplicated union of all tags present across items.
///
/// This is the tag vocabulary the filter UI offers; the current selection
/// is always a subset of it (stale selections are tolerated upstream).
pub fn tag_vocabulary<T: ContentMeta>(items: &[T]) -> Vec<String> {
    let mut tags: Vec<String> = items
        .iter()
        .flat_map(|item| item.tags().iter().cloned())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Project;

    fn project(slug: &str, title: &str, tags: &[&str]) -> Project {
        Project {
            slug: slug.into(),
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn slugs(filtered: &[&Project]) -> Vec<String> {
        filtered.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let items = vec![
            project("a", "Alpha", &["rust"]),
            project("b", "Beta", &[]),
        ];
        let result = filter_items(&items, &[], "");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_tag_filter_is_and_not_or() {
        let items = vec![
            project("both", "Both", &["a", "b"]),
            project("only-a", "Only A", &["a"]),
        ];
        let selected = vec!["a".to_string(), "b".to_string()];
        let result = filter_items(&items, &selected, "");
        assert_eq!(slugs(&result), vec!["both"]);
    }

    #[test]
    fn test_stale_tag_matches_nothing() {
        let items = vec![project("a", "Alpha", &["rust"])];
        let selected = vec!["removed-tag".to_string()];
        assert!(filter_items(&items, &selected, "").is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive_across_fields() {
        let item = project(
            "tci",
            "Twitch Chat Insights",
            &["React", "Twitch API", "Meilisearch"],
        );
        assert!(matches_query(&item, "react"));
        assert!(matches_query(&item, "twitch"));
        assert!(matches_query(&item, "TWITCH"));
        assert!(!matches_query(&item, "postgres"));
    }

    #[test]
    fn test_query_matches_summary_and_emoji() {
        let mut item = project("p", "Punctuator", &[]);
        item.summary = Some("Cleans up AI-generated transcripts".into());
        item.emoji = Some("🧪".into());
        assert!(matches_query(&item, "transcripts"));
        assert!(matches_query(&item, "🧪"));
    }

    #[test]
    fn test_filter_is_order_stable() {
        let items = vec![
            project("z", "Zeta rust", &[]),
            project("a", "Alpha rust", &[]),
            project("m", "Mid rust", &[]),
        ];
        let result = filter_items(&items, &[], "rust");
        assert_eq!(slugs(&result), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_combined_tag_and_query() {
        let items = vec![
            project("match", "Graph Mapper", &["Node.js", "GraphQL"]),
            project("tag-only", "Other", &["Node.js", "GraphQL"]),
            project("query-only", "Graph Thing", &["Python"]),
        ];
        let selected = vec!["GraphQL".to_string()];
        let result = filter_items(&items, &selected, "graph m");
        assert_eq!(slugs(&result), vec!["match"]);
    }

    #[test]
    fn test_tag_vocabulary_sorted_and_deduped() {
        let items = vec![
            project("a", "A", &["rust", "tui"]),
            project("b", "B", &["tui", "signals"]),
        ];
        assert_eq!(tag_vocabulary(&items), vec!["rust", "signals", "tui"]);
    }
}
