use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::fileio::RetryPolicy;
use crate::index::{DEFAULT_INDEX_PATH, IndexSettings};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub bank_root: String,
    /// Folders to skip while indexing, relative to `bank_root`.
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

/// `[index]` section. Every key is optional.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Index file, relative to the bank root unless absolute.
    pub path: PathBuf,
    pub max_age_hours: u64,
    pub auto_rebuild: bool,
    pub rebuild_delay_ms: u64,
    pub extensions: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_INDEX_PATH),
            max_age_hours: 24,
            auto_rebuild: true,
            rebuild_delay_ms: 1000,
            extensions: vec!["md".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub bank_root: PathBuf,
    /// Folders to skip while indexing (resolved to absolute paths).
    pub excluded_folders: Vec<PathBuf>,
    pub index: IndexConfig,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    /// Settings for an [`IndexStore`](crate::index::IndexStore) over this bank.
    pub fn index_settings(&self) -> IndexSettings {
        IndexSettings {
            root: self.bank_root.clone(),
            index_path: self.index.path.clone(),
            max_index_age: Duration::from_secs(self.index.max_age_hours.saturating_mul(60 * 60)),
            auto_rebuild: self.index.auto_rebuild,
            rebuild_delay: Duration::from_millis(self.index.rebuild_delay_ms),
            extensions: self.index.extensions.clone(),
            excluded_folders: self.excluded_folders.clone(),
            retry: RetryPolicy::default(),
        }
    }
}
