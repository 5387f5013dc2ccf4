//! Size and text metrics for indexed documents.

use super::types::FileMetrics;

const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];

/// Compute metrics from the full file text and its frontmatter-free body.
///
/// Size and line count describe the whole file; content lines, words and
/// characters describe the body only.
pub fn compute_metrics(raw: &str, body: &str) -> FileMetrics {
    let size_bytes = raw.len() as u64;
    FileMetrics {
        size_bytes,
        size_formatted: format_size(size_bytes),
        line_count: raw.lines().count(),
        content_line_count: body.lines().filter(|l| !l.trim().is_empty()).count(),
        word_count: body.split_whitespace().count(),
        character_count: body.chars().count(),
    }
}

/// Human-readable size using 1024-based units.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
