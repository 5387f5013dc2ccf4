//! The index store: in-memory entries, persistence, full and incremental
//! maintenance.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;

use super::entry::EntryFactory;
use super::error::IndexError;
use super::events::{ChangeNotifier, IndexEvent, ListenerError, ListenerId};
use super::guard::BuildGuard;
use super::scheduler::RebuildScheduler;
use super::types::{
    IndexRebuildResult, IndexStats, MetadataIndexEntry, RebuildFailure, ValidationStatus,
};
use crate::fileio::{FileSystem, RetryPolicy, TokioFileSystem};
use crate::frontmatter::{FrontmatterParser, YamlFrontmatterParser};
use crate::vault::{VaultWalker, to_relative_key};

/// Default location of the persisted index, relative to the root.
pub const DEFAULT_INDEX_PATH: &str = ".index/metadata.json";

/// Runtime settings of an [`IndexStore`].
#[derive(Debug, Clone)]
pub struct IndexSettings {
    /// Memory bank root; every entry key is relative to it.
    pub root: PathBuf,
    /// Index file, relative to `root` unless absolute.
    pub index_path: PathBuf,
    /// A persisted index older than this is rebuilt on `initialize()`.
    pub max_index_age: Duration,
    pub auto_rebuild: bool,
    pub rebuild_delay: Duration,
    /// Extensions of candidate documents, without the dot.
    pub extensions: Vec<String>,
    pub excluded_folders: Vec<PathBuf>,
    pub retry: RetryPolicy,
}

impl IndexSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            max_index_age: Duration::from_secs(24 * 60 * 60),
            auto_rebuild: true,
            rebuild_delay: Duration::from_millis(1000),
            extensions: vec!["md".to_string()],
            excluded_folders: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Absolute location of the index file.
    pub fn index_file(&self) -> PathBuf {
        if self.index_path.is_absolute() {
            self.index_path.clone()
        } else {
            self.root.join(&self.index_path)
        }
    }
}

/// Owns the metadata index of one memory bank.
///
/// Entries live in memory and are written back to the index file after every
/// mutation. Readers get copies; nothing outside the store can alias its state.
pub struct IndexStore {
    settings: IndexSettings,
    fs: Arc<dyn FileSystem>,
    factory: EntryFactory,
    /// `None` until the index is loaded or built.
    entries: RwLock<Option<Vec<MetadataIndexEntry>>>,
    guard: BuildGuard,
    notifier: ChangeNotifier,
    scheduler: RebuildScheduler,
    last_build_duration_ms: AtomicU64,
}

impl IndexStore {
    pub fn new(
        settings: IndexSettings,
        fs: Arc<dyn FileSystem>,
        parser: Arc<dyn FrontmatterParser>,
    ) -> Self {
        let factory = EntryFactory::new(settings.root.clone(), fs.clone(), parser);
        let scheduler = RebuildScheduler::new(settings.rebuild_delay, settings.auto_rebuild);
        Self {
            settings,
            fs,
            factory,
            entries: RwLock::new(None),
            guard: BuildGuard::new(),
            notifier: ChangeNotifier::new(),
            scheduler,
            last_build_duration_ms: AtomicU64::new(0),
        }
    }

    /// Store backed by `tokio::fs` and YAML frontmatter.
    pub fn open(settings: IndexSettings) -> Self {
        let fs = Arc::new(TokioFileSystem::new(settings.retry));
        Self::new(settings, fs, Arc::new(YamlFrontmatterParser))
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    pub fn is_loaded(&self) -> bool {
        self.read_entries().is_some()
    }

    pub fn is_building(&self) -> bool {
        self.guard.is_building()
    }

    /// Load the persisted index, rebuilding it when corrupt or stale.
    ///
    /// A missing index file yields an empty index. An unreadable or corrupt
    /// file is logged and replaced by a full build. Only a failure of that
    /// build (e.g. the index cannot be written) is returned.
    pub async fn initialize(&self) -> Result<(), IndexError> {
        let index_file = self.settings.index_file();

        match self.load().await {
            Ok(Some(entries)) => {
                tracing::debug!(
                    "Loaded {} index entries from {}",
                    entries.len(),
                    index_file.display()
                );
                self.replace_entries(entries);
                if self.is_stale().await {
                    tracing::info!("Index at {} is stale, rebuilding", index_file.display());
                    self.build_index().await?;
                }
            }
            Ok(None) => {
                tracing::debug!("No index at {}, starting empty", index_file.display());
                self.replace_entries(Vec::new());
            }
            Err(e) => {
                tracing::warn!("Could not load index ({}), rebuilding from scratch", e);
                self.build_index().await?;
            }
        }
        Ok(())
    }

    /// `Ok(None)` when the index file does not exist.
    async fn load(&self) -> Result<Option<Vec<MetadataIndexEntry>>, IndexError> {
        let index_file = self.settings.index_file();
        let raw = match self.fs.read_file(&index_file).await {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(source) => {
                return Err(IndexError::FileRead {
                    path: index_file.display().to_string(),
                    source,
                });
            }
        };

        let entries = serde_json::from_str(&raw).map_err(|source| IndexError::IndexParse {
            path: index_file.display().to_string(),
            source,
        })?;
        Ok(Some(entries))
    }

    async fn is_stale(&self) -> bool {
        let Ok(stat) = self.fs.stat(&self.settings.index_file()).await else {
            return false;
        };
        let Some(modified) = stat.modified else {
            return false;
        };
        // A clock set backwards gives a negative age, which never counts as stale.
        (Utc::now() - modified).to_std().is_ok_and(|age| age > self.settings.max_index_age)
    }

    /// Rebuild the whole index from the files under the root.
    ///
    /// Files that cannot be indexed are recorded in the result and skipped.
    /// Fails with [`IndexError::BuildInProgress`] while another build runs,
    /// and with an I/O error when the root cannot be scanned or the result
    /// cannot be persisted.
    pub async fn build_index(&self) -> Result<IndexRebuildResult, IndexError> {
        let _permit = self.guard.try_acquire().ok_or(IndexError::BuildInProgress)?;
        let start = Instant::now();

        self.replace_entries(Vec::new());

        let walker = VaultWalker::with_options(
            &self.settings.root,
            self.settings.excluded_folders.clone(),
            &self.settings.extensions,
        )
        .and_then(|w| w.walk());
        let files = match walker {
            Ok(files) => files,
            Err(e) => {
                let err = IndexError::from(e);
                self.notifier.emit(&IndexEvent::IndexError { message: err.to_string() });
                return Err(err);
            }
        };

        let mut result = IndexRebuildResult {
            files_processed: 0,
            files_indexed: 0,
            files_errored: 0,
            duration: 0,
            errors: Vec::new(),
            stats: compute_stats(&[], Utc::now(), 0),
        };

        for file in &files {
            result.files_processed += 1;
            match self.factory.create_entry(&file.relative_path).await {
                Ok(entry) => {
                    tracing::debug!("Indexed {}", file.relative_path);
                    self.upsert(entry);
                    result.files_indexed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to index {}: {}", file.relative_path, e);
                    result.errors.push(RebuildFailure {
                        relative_path: file.relative_path.clone(),
                        error: e.to_string(),
                    });
                    result.files_errored += 1;
                }
            }
        }

        result.duration = start.elapsed().as_millis() as u64;
        self.last_build_duration_ms.store(result.duration, Ordering::Relaxed);

        if let Err(e) = self.persist().await {
            self.notifier.emit(&IndexEvent::IndexError { message: e.to_string() });
            return Err(e);
        }

        result.stats = self.current_stats().await?;
        tracing::info!(
            "Index rebuilt: {} indexed, {} errored in {}ms",
            result.files_indexed,
            result.files_errored,
            result.duration
        );
        self.notifier.emit(&IndexEvent::IndexRebuilt(result.stats.clone()));
        Ok(result)
    }

    /// Re-index one file, replacing its entry in place or appending it.
    pub async fn update_entry(&self, path: &str) -> Result<MetadataIndexEntry, IndexError> {
        self.ensure_loaded()?;
        let key = self.normalize_key(path);

        let entry = self.factory.create_entry(&key).await?;
        let existed = self.upsert(entry.clone());
        self.persist().await?;

        tracing::debug!("{} index entry {}", if existed { "Updated" } else { "Added" }, key);
        let event = if existed {
            IndexEvent::EntryUpdated(entry.clone())
        } else {
            IndexEvent::EntryAdded(entry.clone())
        };
        self.notifier.emit(&event);
        Ok(entry)
    }

    /// Drop the entry for `path`. Returns `false` (and writes nothing) if
    /// there was none.
    pub async fn remove_entry(&self, path: &str) -> Result<bool, IndexError> {
        let key = self.normalize_key(path);
        let removed = {
            let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let entries = guard.as_mut().ok_or(IndexError::NotLoaded)?;
            let before = entries.len();
            entries.retain(|e| e.relative_path != key);
            entries.len() != before
        };

        if !removed {
            return Ok(false);
        }

        self.persist().await?;
        tracing::debug!("Removed index entry {}", key);
        self.notifier.emit(&IndexEvent::EntryRemoved { relative_path: key });
        Ok(true)
    }

    /// Independent copy of every entry, in insertion order.
    pub fn get_index(&self) -> Result<Vec<MetadataIndexEntry>, IndexError> {
        self.read_entries().ok_or(IndexError::NotLoaded)
    }

    pub fn get_entry(&self, path: &str) -> Result<Option<MetadataIndexEntry>, IndexError> {
        let key = self.normalize_key(path);
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entries = guard.as_ref().ok_or(IndexError::NotLoaded)?;
        Ok(entries.iter().find(|e| e.relative_path == key).cloned())
    }

    pub async fn get_index_stats(&self) -> Result<IndexStats, IndexError> {
        self.ensure_loaded()?;
        self.current_stats().await
    }

    /// Schedule a debounced background rebuild.
    ///
    /// Returns `false` when auto-rebuild is disabled or no runtime is active.
    /// A failing background build is logged, never reported.
    pub fn trigger_auto_rebuild(self: &Arc<Self>) -> bool {
        let store = Arc::downgrade(self);
        self.scheduler.schedule(async move {
            let Some(store) = store.upgrade() else {
                return;
            };
            match store.build_index().await {
                Ok(result) => tracing::debug!(
                    "Automatic rebuild indexed {} files",
                    result.files_indexed
                ),
                Err(e) => tracing::warn!("Automatic index rebuild failed: {}", e),
            }
        })
    }

    pub fn add_event_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&IndexEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.notifier.add_listener(listener)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    async fn current_stats(&self) -> Result<IndexStats, IndexError> {
        let last_build_time = match self.fs.stat(&self.settings.index_file()).await {
            Ok(stat) => stat.modified.unwrap_or_else(Utc::now),
            Err(_) => Utc::now(),
        };
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entries = guard.as_ref().ok_or(IndexError::NotLoaded)?;
        Ok(compute_stats(
            entries,
            last_build_time,
            self.last_build_duration_ms.load(Ordering::Relaxed),
        ))
    }

    /// Write the whole index to disk, creating its directory as needed.
    async fn persist(&self) -> Result<(), IndexError> {
        let json = {
            let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            let entries = guard.as_ref().ok_or(IndexError::NotLoaded)?;
            serde_json::to_string_pretty(entries).map_err(IndexError::Serialize)?
        };

        let index_file = self.settings.index_file();
        if let Some(dir) = index_file.parent() {
            self.fs.mkdir(dir, true).await.map_err(|source| IndexError::DirCreate {
                path: dir.display().to_string(),
                source,
            })?;
        }
        self.fs.write_file(&index_file, &json).await.map_err(|source| {
            IndexError::FileWrite { path: index_file.display().to_string(), source }
        })
    }

    /// Insert or replace by key. Returns whether an entry was replaced.
    fn upsert(&self, entry: MetadataIndexEntry) -> bool {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entries = guard.get_or_insert_with(Vec::new);
        match entries.iter_mut().find(|e| e.relative_path == entry.relative_path) {
            Some(existing) => {
                *existing = entry;
                true
            }
            None => {
                entries.push(entry);
                false
            }
        }
    }

    fn replace_entries(&self, entries: Vec<MetadataIndexEntry>) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = Some(entries);
    }

    fn read_entries(&self) -> Option<Vec<MetadataIndexEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn ensure_loaded(&self) -> Result<(), IndexError> {
        if self.is_loaded() { Ok(()) } else { Err(IndexError::NotLoaded) }
    }

    /// Map user input (`./a.md`, `a\b.md`, an absolute path under the root)
    /// to the index key.
    fn normalize_key(&self, path: &str) -> String {
        let candidate = Path::new(path);
        let relative = candidate.strip_prefix(&self.settings.root).unwrap_or(candidate);
        to_relative_key(relative)
            .replace('\\', "/")
            .trim_start_matches("./")
            .to_string()
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("settings", &self.settings)
            .field("loaded", &self.is_loaded())
            .field("building", &self.is_building())
            .finish_non_exhaustive()
    }
}

/// Aggregate counts over `entries`.
pub fn compute_stats(
    entries: &[MetadataIndexEntry],
    last_build_time: chrono::DateTime<Utc>,
    last_build_duration: u64,
) -> IndexStats {
    let mut stats = IndexStats {
        total_files: entries.len(),
        valid_files: 0,
        invalid_files: 0,
        unchecked_files: 0,
        total_size_bytes: 0,
        total_line_count: 0,
        files_by_type: BTreeMap::new(),
        files_by_tag: BTreeMap::new(),
        last_build_time,
        last_build_duration,
    };

    for entry in entries {
        match entry.validation_status {
            ValidationStatus::Valid => stats.valid_files += 1,
            ValidationStatus::Invalid => stats.invalid_files += 1,
            ValidationStatus::Unchecked => stats.unchecked_files += 1,
            ValidationStatus::SchemaNotFound => {}
        }
        stats.total_size_bytes += entry.file_metrics.size_bytes;
        stats.total_line_count += entry.file_metrics.line_count;

        let file_type = entry.file_type.clone().unwrap_or_else(|| "unknown".to_string());
        *stats.files_by_type.entry(file_type).or_default() += 1;
        for tag in entry.tags() {
            *stats.files_by_tag.entry(tag.clone()).or_default() += 1;
        }
    }

    stats
}
