//! Aggregate views over the index: stats, tags, types.

use std::path::Path;

use membank_core::index::format_size;
use membank_core::search::SearchEngine;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::output::print_json;
use super::{load_config, load_entries, open_store};

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled, Serialize)]
struct CountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Files")]
    count: usize,
}

pub async fn stats(config: Option<&Path>, profile: Option<&str>, json: bool) {
    let rc = load_config(config, profile);
    let store = open_store(&rc).await;

    let stats = match store.get_index_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error computing stats: {}", e);
            std::process::exit(1);
        }
    };

    if json {
        print_json(&stats);
        return;
    }

    let rows = vec![
        StatRow { metric: "Total files", value: stats.total_files.to_string() },
        StatRow { metric: "Valid", value: stats.valid_files.to_string() },
        StatRow { metric: "Invalid", value: stats.invalid_files.to_string() },
        StatRow { metric: "Unchecked", value: stats.unchecked_files.to_string() },
        StatRow { metric: "Total size", value: format_size(stats.total_size_bytes) },
        StatRow { metric: "Total lines", value: stats.total_line_count.to_string() },
        StatRow { metric: "Types", value: stats.files_by_type.len().to_string() },
        StatRow { metric: "Tags", value: stats.files_by_tag.len().to_string() },
        StatRow {
            metric: "Last build",
            value: stats.last_build_time.format("%Y-%m-%d %H:%M").to_string(),
        },
        StatRow { metric: "Build duration", value: format!("{}ms", stats.last_build_duration) },
    ];
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub async fn tags(config: Option<&Path>, profile: Option<&str>, json: bool) {
    let entries = load_entries(config, profile).await;
    print_counts(SearchEngine::new(&entries).get_tag_stats(), json);
}

pub async fn types(config: Option<&Path>, profile: Option<&str>, json: bool) {
    let entries = load_entries(config, profile).await;
    print_counts(SearchEngine::new(&entries).get_type_stats(), json);
}

fn print_counts(counts: Vec<(String, usize)>, json: bool) {
    let rows: Vec<CountRow> =
        counts.into_iter().map(|(name, count)| CountRow { name, count }).collect();
    if json {
        print_json(&rows);
    } else if rows.is_empty() {
        println!("(none)");
    } else {
        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}
