//! Relevance scoring, ordering and pagination of result sets.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::filter::{parse_date, searchable_text};
use crate::index::MetadataIndexEntry;

/// Field to order results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Created,
    Updated,
    Title,
    Size,
    Lines,
    Relevance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Title => "title",
            Self::Size => "size",
            Self::Lines => "lines",
            Self::Relevance => "relevance",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "title" => Ok(Self::Title),
            "size" => Ok(Self::Size),
            "lines" => Ok(Self::Lines),
            "relevance" => Ok(Self::Relevance),
            other => Err(format!("unknown sort field '{other}'")),
        }
    }
}

/// Score in `[0, 1]` of how well `text` matches `query`.
///
/// A whole-word occurrence of the query scores in `[0.8, 1.0]`, higher the
/// earlier it appears. Otherwise each query word that contains, or is
/// contained in, some text word earns a share of `0.6`.
///
/// An occurrence inside a longer word is not a whole-word match: `"brief"`
/// against `"briefing notes"` scores `0.6` through word overlap, so
/// `"Project Brief"` outranks `"about briefing"`.
pub fn relevance_score(query: &str, text: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let text = text.to_lowercase();
    if query.is_empty() || text.is_empty() {
        return 0.0;
    }

    if let Some(byte_index) = find_phrase(&text, &query) {
        let position = text[..byte_index].chars().count() as f64;
        let length = text.chars().count() as f64;
        return 0.8 + (1.0 - position / length) * 0.2;
    }

    let query_words: Vec<&str> = query.split_whitespace().collect();
    let text_words: Vec<&str> = text.split_whitespace().collect();
    let matched = query_words
        .iter()
        .filter(|q| text_words.iter().any(|t| t.contains(*q) || q.contains(t)))
        .count();

    matched as f64 / query_words.len() as f64 * 0.6
}

/// First occurrence of `needle` not glued to alphanumerics on either side.
fn find_phrase(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Stable sort by descending relevance to `query`.
pub fn rank_by_relevance(entries: &mut [MetadataIndexEntry], query: &str) {
    let mut scored: Vec<(f64, MetadataIndexEntry)> = entries
        .iter()
        .map(|e| (relevance_score(query, &searchable_text(e)), e.clone()))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    for (slot, (_, entry)) in entries.iter_mut().zip(scored) {
        *slot = entry;
    }
}

/// Compare two entries on `sort_by`, ascending.
///
/// `Relevance` compares equal: relevance ordering is a separate ranking pass.
pub fn compare_entries(
    a: &MetadataIndexEntry,
    b: &MetadataIndexEntry,
    sort_by: SortBy,
) -> Ordering {
    match sort_by {
        SortBy::Created => compare_dates(&a.created, &b.created),
        SortBy::Updated => compare_dates(&a.updated, &b.updated),
        SortBy::Title => a.display_title().to_lowercase().cmp(&b.display_title().to_lowercase()),
        SortBy::Size => a.file_metrics.size_bytes.cmp(&b.file_metrics.size_bytes),
        SortBy::Lines => a.file_metrics.line_count.cmp(&b.file_metrics.line_count),
        SortBy::Relevance => Ordering::Equal,
    }
}

/// Unparsable dates sort before every valid one.
fn compare_dates(a: &str, b: &str) -> Ordering {
    parse_date(a).cmp(&parse_date(b))
}

/// Stable sort on `sort_by` in the given order.
pub fn sort_entries(entries: &mut [MetadataIndexEntry], sort_by: SortBy, order: SortOrder) {
    entries.sort_by(|a, b| {
        let ord = compare_entries(a, b, sort_by);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// One page of a result list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Length of the list before slicing.
    pub total: usize,
    pub has_more: bool,
}

/// Slice `items[offset..offset + limit]`.
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let page: Vec<T> = items.into_iter().skip(offset).take(limit).collect();
    let has_more = offset + page.len() < total;
    Page { items: page, total, has_more }
}
