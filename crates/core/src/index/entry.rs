//! Turning one document on disk into a [`MetadataIndexEntry`].

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use super::error::IndexError;
use super::infer::infer_file_type;
use super::metrics::compute_metrics;
use super::types::{MetadataIndexEntry, ValidationStatus};
use crate::fileio::{FileStat, FileSystem};
use crate::frontmatter::{FrontmatterParser, ParsedDocument};

/// Render a timestamp the way the index stores it (`2024-01-15T10:30:00.000Z`).
pub fn iso_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds index entries by reading files through the injected collaborators.
pub struct EntryFactory {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    parser: Arc<dyn FrontmatterParser>,
}

impl EntryFactory {
    pub fn new(
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        parser: Arc<dyn FrontmatterParser>,
    ) -> Self {
        Self { root: root.into(), fs, parser }
    }

    /// Stat and read `relative_path`, then derive its entry.
    pub async fn create_entry(
        &self,
        relative_path: &str,
    ) -> Result<MetadataIndexEntry, IndexError> {
        let path = self.root.join(relative_path);

        let stat = self.fs.stat(&path).await.map_err(|source| IndexError::FileStat {
            path: relative_path.to_string(),
            source,
        })?;

        let raw = self.fs.read_file(&path).await.map_err(|source| IndexError::FileRead {
            path: relative_path.to_string(),
            source,
        })?;

        let parsed = self.parser.parse(&raw).unwrap_or_else(|e| {
            tracing::debug!("Ignoring frontmatter of {}: {}", relative_path, e);
            ParsedDocument::plain(&raw)
        });

        Ok(build_entry(relative_path, &raw, &parsed, &stat, Utc::now()))
    }
}

/// Derive an entry from already-read content.
///
/// Frontmatter values win over filesystem metadata; `now` fills any timestamp
/// neither source provides and stamps `last_indexed`.
pub fn build_entry(
    relative_path: &str,
    raw: &str,
    parsed: &ParsedDocument,
    stat: &FileStat,
    now: DateTime<Utc>,
) -> MetadataIndexEntry {
    let fm = parsed.frontmatter.as_ref();
    let field = |key: &str| fm.and_then(|f| f.string_field(key));

    let created = field("created")
        .or_else(|| stat.created.map(iso_timestamp))
        .unwrap_or_else(|| iso_timestamp(now));
    let updated = field("updated")
        .or_else(|| stat.modified.map(iso_timestamp))
        .unwrap_or_else(|| iso_timestamp(now));

    MetadataIndexEntry {
        relative_path: relative_path.to_string(),
        id: field("id"),
        file_type: Some(field("type").unwrap_or_else(|| infer_file_type(relative_path))),
        title: field("title"),
        description: field("description"),
        tags: fm.and_then(|f| f.string_list_field("tags")),
        created,
        updated,
        file_metrics: compute_metrics(raw, &parsed.body),
        validation_status: ValidationStatus::Unchecked,
        validation_errors: None,
        actual_schema_used: None,
        last_indexed: iso_timestamp(now),
    }
}
