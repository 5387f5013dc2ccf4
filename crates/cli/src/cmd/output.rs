//! Shared output formatting for query commands.

use membank_core::index::MetadataIndexEntry;
use membank_core::search::parse_date;
use tabled::{settings::Style, Table, Tabled};

/// Row of the entry table.
#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Type")]
    file_type: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Size")]
    size: String,
}

impl From<&MetadataIndexEntry> for EntryRow {
    fn from(entry: &MetadataIndexEntry) -> Self {
        Self {
            path: truncate(&entry.relative_path, 50),
            file_type: entry.file_type.clone().unwrap_or_default(),
            title: truncate(entry.title.as_deref().unwrap_or("-"), 40),
            updated: format_date(&entry.updated),
            size: entry.file_metrics.size_formatted.clone(),
        }
    }
}

/// Print entries as a table.
pub fn print_entries_table(entries: &[MetadataIndexEntry]) {
    if entries.is_empty() {
        println!("(no entries found)");
        return;
    }
    let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Print entries as paths only (quiet mode).
pub fn print_entries_quiet(entries: &[MetadataIndexEntry]) {
    for entry in entries {
        println!("{}", entry.relative_path);
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// `YYYY-MM-DD HH:MM` when the value parses, the raw value otherwise.
fn format_date(value: &str) -> String {
    parse_date(value)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Truncate string with ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long title here", 10), "a long ...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T10:30:00.000Z"), "2024-03-05 10:30");
        assert_eq!(format_date("someday"), "someday");
    }
}
