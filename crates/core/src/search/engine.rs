//! Query side of the index: filtered, ranked, paginated search over a
//! snapshot of entries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::filter::{MetadataFilter, matches_all_tags, matches_query, matches_type};
use super::rank::{SortBy, SortOrder, paginate, rank_by_relevance, sort_entries};
use crate::index::{MetadataIndexEntry, ValidationStatus};

/// Default page size of [`SearchEngine::search`].
pub const DEFAULT_LIMIT: usize = 50;

/// Search parameters: a metadata filter plus text query, ordering and paging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(flatten)]
    pub filter: MetadataFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            filter: MetadataFilter::default(),
            query: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_by: None,
            sort_order: SortOrder::Desc,
        }
    }
}

impl SearchOptions {
    /// The trimmed query, if one was given and is not blank.
    pub fn text_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub results: Vec<MetadataIndexEntry>,
    /// Matches before pagination.
    pub total: usize,
    pub has_more: bool,
    pub offset: usize,
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub filters: MetadataFilter,
}

/// Read-only queries over a slice of entries.
pub struct SearchEngine<'a> {
    entries: &'a [MetadataIndexEntry],
}

impl<'a> SearchEngine<'a> {
    pub fn new(entries: &'a [MetadataIndexEntry]) -> Self {
        Self { entries }
    }

    /// Filter, match the text query, order and paginate.
    ///
    /// A text query ranks by relevance unless an explicit non-relevance
    /// `sort_by` is given. With neither, insertion order is kept.
    pub fn search(&self, options: &SearchOptions) -> SearchResult {
        let query = options.text_query();

        let mut matches: Vec<MetadataIndexEntry> = self
            .entries
            .iter()
            .filter(|e| options.filter.matches(e))
            .filter(|e| query.is_none_or(|q| matches_query(e, q)))
            .cloned()
            .collect();

        match (options.sort_by, query) {
            (None | Some(SortBy::Relevance), Some(q)) => rank_by_relevance(&mut matches, q),
            (Some(SortBy::Relevance) | None, None) => {}
            (Some(sort_by), _) => sort_entries(&mut matches, sort_by, options.sort_order),
        }

        let page = paginate(matches, options.offset, options.limit);
        tracing::debug!(
            "Search matched {} entries, returning {}",
            page.total,
            page.items.len()
        );

        SearchResult {
            results: page.items,
            total: page.total,
            has_more: page.has_more,
            offset: options.offset,
            limit: options.limit,
            query: query.map(str::to_string),
            filters: options.filter.clone(),
        }
    }

    /// Every entry passing `filter`, in index order.
    pub fn find_by_metadata(&self, filter: &MetadataFilter) -> Vec<MetadataIndexEntry> {
        self.collect(|e| filter.matches(e))
    }

    /// Entries carrying all of `tags`.
    pub fn find_by_tags(&self, tags: &[String]) -> Vec<MetadataIndexEntry> {
        self.collect(|e| matches_all_tags(e, tags))
    }

    pub fn find_by_type(&self, file_type: &str) -> Vec<MetadataIndexEntry> {
        self.collect(|e| matches_type(e, Some(file_type)))
    }

    pub fn find_by_validation_status(&self, status: ValidationStatus) -> Vec<MetadataIndexEntry> {
        self.collect(|e| e.validation_status == status)
    }

    /// The `limit` most recently updated entries, newest first.
    pub fn find_recently_updated(&self, limit: usize) -> Vec<MetadataIndexEntry> {
        self.top(limit, SortBy::Updated)
    }

    /// The `limit` largest entries by byte size, largest first.
    pub fn find_largest_files(&self, limit: usize) -> Vec<MetadataIndexEntry> {
        self.top(limit, SortBy::Size)
    }

    /// Distinct tags, sorted.
    pub fn get_all_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self.entries.iter().flat_map(|e| e.tags()).collect();
        tags.into_iter().cloned().collect()
    }

    /// Distinct declared or inferred types, sorted.
    pub fn get_all_file_types(&self) -> Vec<String> {
        let types: BTreeSet<&String> =
            self.entries.iter().filter_map(|e| e.file_type.as_ref()).collect();
        types.into_iter().cloned().collect()
    }

    /// `(tag, count)` pairs, most used first, ties by name.
    pub fn get_tag_stats(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for tag in self.entries.iter().flat_map(|e| e.tags()) {
            *counts.entry(tag.clone()).or_default() += 1;
        }
        by_count(counts)
    }

    /// `(type, count)` pairs, most used first, ties by name. Untyped entries
    /// count as `unknown`.
    pub fn get_type_stats(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.entries {
            let file_type = entry.file_type.as_deref().unwrap_or("unknown");
            *counts.entry(file_type.to_string()).or_default() += 1;
        }
        by_count(counts)
    }

    fn collect(&self, predicate: impl Fn(&MetadataIndexEntry) -> bool) -> Vec<MetadataIndexEntry> {
        self.entries.iter().filter(|e| predicate(e)).cloned().collect()
    }

    fn top(&self, limit: usize, sort_by: SortBy) -> Vec<MetadataIndexEntry> {
        let mut entries = self.entries.to_vec();
        sort_entries(&mut entries, sort_by, SortOrder::Desc);
        entries.truncate(limit);
        entries
    }
}

fn by_count(counts: BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    // BTreeMap order already breaks ties by name; the sort is stable.
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs
}
