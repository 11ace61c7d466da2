//! Relevance scoring.
//!
//! Case-insensitive literal substring matching only. The query is never
//! compiled into a pattern, so metacharacters in it carry no meaning.

use crate::store::Document;

pub const TITLE_WEIGHT: u32 = 10;
pub const CONTENT_OCCURRENCE_WEIGHT: u32 = 2;
pub const TAG_WEIGHT: u32 = 5;
pub const CATEGORY_WEIGHT: u32 = 3;

/// Score `doc` against `query`. Zero means "not a match".
///
/// - title contains query: +10 (flat)
/// - +2 per non-overlapping occurrence in content
/// - +5 per tag containing the query
/// - category contains query: +3 (flat)
///
/// An empty query matches nothing.
pub fn score(doc: &Document, query: &str) -> u32 {
    if query.is_empty() {
        return 0;
    }
    let needle = query.to_lowercase();

    let mut total = 0u32;

    if doc.title.to_lowercase().contains(&needle) {
        total = total.saturating_add(TITLE_WEIGHT);
    }

    let occurrences = count_occurrences(&doc.content.to_lowercase(), &needle);
    total = total.saturating_add(occurrences.saturating_mul(CONTENT_OCCURRENCE_WEIGHT));

    let tag_hits = doc
        .tags
        .iter()
        .filter(|tag| tag.to_lowercase().contains(&needle))
        .count();
    total = total.saturating_add(saturating_u32(tag_hits).saturating_mul(TAG_WEIGHT));

    if doc.category.to_lowercase().contains(&needle) {
        total = total.saturating_add(CATEGORY_WEIGHT);
    }

    total
}

/// Count non-overlapping literal occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    saturating_u32(haystack.matches(needle).count())
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
