//! Pure predicates over index entries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::{MetadataIndexEntry, ValidationStatus};

/// Structured metadata filter. Every set field must match (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFilter {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Matches entries carrying any of these tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_status: Option<ValidationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_line_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_line_count: Option<usize>,
}

impl MetadataFilter {
    /// Composite predicate: AND of every active criterion.
    pub fn matches(&self, entry: &MetadataIndexEntry) -> bool {
        matches_type(entry, self.file_type.as_deref())
            && self.tags.as_deref().is_none_or(|tags| matches_any_tag(entry, tags))
            && self.validation_status.is_none_or(|s| entry.validation_status == s)
            && in_date_range(&entry.created, self.created_after, self.created_before)
            && in_date_range(&entry.updated, self.updated_after, self.updated_before)
            && in_range(entry.file_metrics.size_bytes, self.min_size_bytes, self.max_size_bytes)
            && in_range(entry.file_metrics.line_count, self.min_line_count, self.max_line_count)
    }
}

/// Exact type equality; `None` matches everything.
pub fn matches_type(entry: &MetadataIndexEntry, file_type: Option<&str>) -> bool {
    file_type.is_none_or(|t| entry.file_type.as_deref() == Some(t))
}

/// True if the entry has at least one of `tags` (case-insensitive).
/// An empty request matches everything.
pub fn matches_any_tag(entry: &MetadataIndexEntry, tags: &[String]) -> bool {
    tags.is_empty() || tags.iter().any(|wanted| has_tag(entry, wanted))
}

/// True if the entry has every one of `tags` (case-insensitive).
pub fn matches_all_tags(entry: &MetadataIndexEntry, tags: &[String]) -> bool {
    tags.iter().all(|wanted| has_tag(entry, wanted))
}

fn has_tag(entry: &MetadataIndexEntry, wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    entry.tags().iter().any(|t| t.to_lowercase() == wanted)
}

/// Inclusive bounds on a timestamp string; unparsable values never match a
/// bounded range.
pub fn in_date_range(
    value: &str,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> bool {
    if after.is_none() && before.is_none() {
        return true;
    }
    let Some(date) = parse_date(value) else {
        return false;
    };
    after.is_none_or(|a| date >= a) && before.is_none_or(|b| date <= b)
}

/// Inclusive numeric bounds.
pub fn in_range<T: PartialOrd + Copy>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
}

/// Case-insensitive substring match against [`searchable_text`].
pub fn matches_query(entry: &MetadataIndexEntry, query: &str) -> bool {
    searchable_text(entry).contains(&query.to_lowercase())
}

/// Lower-cased title, description, path, type and tags of an entry.
pub fn searchable_text(entry: &MetadataIndexEntry) -> String {
    let tags = entry.tags().join(" ");
    [
        entry.title.as_deref().unwrap_or_default(),
        entry.description.as_deref().unwrap_or_default(),
        entry.relative_path.as_str(),
        entry.file_type.as_deref().unwrap_or_default(),
        tags.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// Lenient timestamp parsing.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS` and
/// `YYYY-MM-DD`; values without an offset are taken as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FileMetrics;
    use chrono::TimeZone;

    fn entry(path: &str, tags: &[&str]) -> MetadataIndexEntry {
        MetadataIndexEntry {
            relative_path: path.to_string(),
            id: None,
            file_type: Some("progress".into()),
            title: Some("Weekly Progress".into()),
            description: Some("Status of the sprint".into()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            created: "2024-01-10T00:00:00.000Z".into(),
            updated: "2024-02-10".into(),
            file_metrics: FileMetrics {
                size_bytes: 2048,
                size_formatted: "2.0 KB".into(),
                line_count: 40,
                content_line_count: 30,
                word_count: 300,
                character_count: 2000,
            },
            validation_status: ValidationStatus::Unchecked,
            validation_errors: None,
            actual_schema_used: None,
            last_indexed: "2024-02-11T00:00:00.000Z".into(),
        }
    }

    fn tags(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_semantics_or_versus_and() {
        let entries =
            [entry("1.md", &["a", "b"]), entry("2.md", &["b"]), entry("3.md", &["c"])];
        let wanted = tags(&["a", "b"]);

        let any: Vec<_> = entries
            .iter()
            .filter(|e| matches_any_tag(e, &wanted))
            .map(|e| e.relative_path.as_str())
            .collect();
        let all: Vec<_> = entries
            .iter()
            .filter(|e| matches_all_tags(e, &wanted))
            .map(|e| e.relative_path.as_str())
            .collect();

        assert_eq!(any, vec!["1.md", "2.md"]);
        assert_eq!(all, vec!["1.md"]);
    }

    #[test]
    fn test_tags_case_insensitive() {
        let e = entry("x.md", &["Planning"]);
        assert!(matches_any_tag(&e, &tags(&["PLANNING"])));
        assert!(matches_all_tags(&e, &tags(&["planning"])));
    }

    #[test]
    fn test_composite_filter_is_and() {
        let e = entry("x.md", &["a"]);
        let mut filter = MetadataFilter {
            file_type: Some("progress".into()),
            tags: Some(tags(&["a"])),
            min_size_bytes: Some(2048),
            max_line_count: Some(40),
            ..Default::default()
        };
        assert!(filter.matches(&e));

        filter.validation_status = Some(ValidationStatus::Valid);
        assert!(!filter.matches(&e));
    }

    #[test]
    fn test_type_filter_is_exact() {
        let e = entry("x.md", &[]);
        assert!(matches_type(&e, None));
        assert!(matches_type(&e, Some("progress")));
        assert!(!matches_type(&e, Some("Progress")));
        assert!(!matches_type(&e, Some("prog")));
    }

    #[test]
    fn test_date_ranges() {
        let e = entry("x.md", &[]);
        let jan_1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let jan_10 = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let feb_1 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        assert!(in_date_range(&e.created, Some(jan_1), Some(feb_1)));
        assert!(in_date_range(&e.created, Some(jan_10), None));
        assert!(!in_date_range(&e.created, None, Some(jan_1)));
        assert!(in_date_range(&e.updated, Some(feb_1), None));
    }

    #[test]
    fn test_unparsable_date_fails_bounded_predicate() {
        let jan_1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(!in_date_range("last tuesday", Some(jan_1), None));
        assert!(in_date_range("last tuesday", None, None));
    }

    #[test]
    fn test_numeric_bounds_inclusive() {
        assert!(in_range(10, Some(10), Some(10)));
        assert!(!in_range(9, Some(10), None));
        assert!(!in_range(11, None, Some(10)));
        assert!(in_range(5u64, None, None));
    }

    #[test]
    fn test_query_covers_all_fields() {
        let e = entry("notes/sprint-3.md", &["Backend"]);
        assert!(matches_query(&e, "WEEKLY"));
        assert!(matches_query(&e, "sprint"));
        assert!(matches_query(&e, "sprint-3.md"));
        assert!(matches_query(&e, "progress"));
        assert!(matches_query(&e, "backend"));
        assert!(!matches_query(&e, "frontend"));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(parse_date("2024-03-05T10:30:00Z"), Some(expected));
        assert_eq!(parse_date("2024-03-05T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_date("2024-03-05T10:30:00"), Some(expected));
        assert_eq!(parse_date("2024-03-05 10:30:00"), Some(expected));
        assert_eq!(parse_date("2024-03-05T10:30"), Some(expected));
        assert_eq!(
            parse_date("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date("05/03/2024"), None);
    }
}
