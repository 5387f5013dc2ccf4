//! Index data types for memory bank documents.
//!
//! These are persisted as-is: field names are camelCase on disk so the
//! `metadata.json` file stays readable by other tools working on the same
//! memory bank.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation state of a document against its schema.
///
/// The index only ever writes `Unchecked`; an external validator advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    #[default]
    Unchecked,
    SchemaNotFound,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Unchecked => "unchecked",
            Self::SchemaNotFound => "schema_not_found",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            "unchecked" => Ok(Self::Unchecked),
            "schema_not_found" => Ok(Self::SchemaNotFound),
            other => Err(format!("unknown validation status '{other}'")),
        }
    }
}

/// Size and text metrics of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub size_bytes: u64,
    pub size_formatted: String,
    /// Lines of the whole file, frontmatter included.
    pub line_count: usize,
    /// Non-blank lines of the body.
    pub content_line_count: usize,
    /// Words of the body.
    pub word_count: usize,
    /// Characters of the body.
    pub character_count: usize,
}

/// One indexed document, keyed by `relative_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataIndexEntry {
    /// Path relative to the index root; identity key.
    pub relative_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// ISO-8601 creation time.
    pub created: String,
    /// ISO-8601 last update time.
    pub updated: String,
    pub file_metrics: FileMetrics,
    #[serde(default)]
    pub validation_status: ValidationStatus,
    /// Opaque, written by the external validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<serde_json::Value>,
    /// Opaque, written by the external validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_schema_used: Option<String>,
    /// When the entry was produced.
    pub last_indexed: String,
}

impl MetadataIndexEntry {
    /// Tags of the entry, empty when none were declared.
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    /// Title, falling back to the relative path.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.relative_path)
    }
}

/// Aggregate view over the whole index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub unchecked_files: usize,
    pub total_size_bytes: u64,
    pub total_line_count: usize,
    pub files_by_type: BTreeMap<String, usize>,
    pub files_by_tag: BTreeMap<String, usize>,
    pub last_build_time: DateTime<Utc>,
    /// Duration of the most recent build in this process, in milliseconds.
    pub last_build_duration: u64,
}

/// A file that could not be indexed during a full build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildFailure {
    pub relative_path: String,
    pub error: String,
}

/// Outcome of one full build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRebuildResult {
    pub files_processed: usize,
    pub files_indexed: usize,
    pub files_errored: usize,
    /// Build duration in milliseconds.
    pub duration: u64,
    pub errors: Vec<RebuildFailure>,
    pub stats: IndexStats,
}
