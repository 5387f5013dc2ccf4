//! Search command implementation.

use std::path::Path;

use chrono::{DateTime, Utc};
use membank_core::index::ValidationStatus;
use membank_core::search::{
    MetadataFilter, SearchEngine, SearchOptions, SearchResult, SortBy, SortOrder, parse_date,
};

use super::load_entries;
use super::output::{print_entries_quiet, print_entries_table, print_json};
use crate::{OrderArg, OutputFormat, SearchArgs, SortArg, StatusArg};

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Created => SortBy::Created,
            SortArg::Updated => SortBy::Updated,
            SortArg::Title => SortBy::Title,
            SortArg::Size => SortBy::Size,
            SortArg::Lines => SortBy::Lines,
            SortArg::Relevance => SortBy::Relevance,
        }
    }
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

impl From<StatusArg> for ValidationStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Valid => ValidationStatus::Valid,
            StatusArg::Invalid => ValidationStatus::Invalid,
            StatusArg::Unchecked => ValidationStatus::Unchecked,
            StatusArg::SchemaNotFound => ValidationStatus::SchemaNotFound,
        }
    }
}

/// Clap value parser for date bounds.
pub fn parse_date_arg(value: &str) -> Result<DateTime<Utc>, String> {
    parse_date(value)
        .ok_or_else(|| format!("invalid date '{value}' (expected YYYY-MM-DD or RFC 3339)"))
}

/// Translate command-line arguments into search options.
pub fn build_options(args: SearchArgs) -> SearchOptions {
    SearchOptions {
        filter: MetadataFilter {
            file_type: args.r#type,
            tags: (!args.tags.is_empty()).then_some(args.tags),
            validation_status: args.status.map(Into::into),
            created_after: args.created_after,
            created_before: args.created_before,
            updated_after: args.updated_after,
            updated_before: args.updated_before,
            min_size_bytes: args.min_size,
            max_size_bytes: args.max_size,
            min_line_count: args.min_lines,
            max_line_count: args.max_lines,
        },
        query: args.query,
        limit: args.limit,
        offset: args.offset,
        sort_by: args.sort.map(Into::into),
        sort_order: args.order.into(),
    }
}

pub async fn run(config: Option<&Path>, profile: Option<&str>, args: SearchArgs) {
    let format = if args.json { OutputFormat::Json } else { args.output };
    let options = build_options(args);

    let entries = load_entries(config, profile).await;
    let result = SearchEngine::new(&entries).search(&options);

    match format {
        OutputFormat::Table => print_results_table(&result),
        OutputFormat::Json => print_json(&result),
        OutputFormat::Quiet => print_entries_quiet(&result.results),
    }
}

fn print_results_table(result: &SearchResult) {
    print_entries_table(&result.results);
    if result.results.is_empty() {
        return;
    }
    println!();
    let first = result.offset + 1;
    let last = result.offset + result.results.len();
    println!("-- {}-{} of {} results --", first, last, result.total);
    if result.has_more {
        println!("(more available: --offset {})", last);
    }
}
