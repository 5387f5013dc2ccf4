//! Subcommand implementations.

pub mod doctor;
pub mod entry;
pub mod output;
pub mod reindex;
pub mod search;
pub mod stats;

use std::path::Path;

use membank_core::config::loader::ConfigLoader;
use membank_core::config::types::ResolvedConfig;
use membank_core::index::IndexStore;

/// Load configuration and start logging, exiting on failure.
pub(crate) fn load_config(config: Option<&Path>, profile: Option<&str>) -> ResolvedConfig {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    crate::logging::init(&rc);
    rc
}

/// Open the bank's index store and load (or heal) its index.
pub(crate) async fn open_store(rc: &ResolvedConfig) -> IndexStore {
    let settings = rc.index_settings();
    tracing::debug!("Opening index at {}", settings.index_file().display());
    let store = IndexStore::open(settings);
    if let Err(e) = store.initialize().await {
        eprintln!("Error loading index: {}", e);
        std::process::exit(1);
    }
    store
}

/// Load the index entries, hinting at `reindex` when there are none.
pub(crate) async fn load_entries(
    config: Option<&Path>,
    profile: Option<&str>,
) -> Vec<membank_core::index::MetadataIndexEntry> {
    let rc = load_config(config, profile);
    let store = open_store(&rc).await;
    match store.get_index() {
        Ok(entries) => {
            if entries.is_empty() {
                eprintln!("Hint: Run 'mbk reindex' to build the index first.");
            }
            entries
        }
        Err(e) => {
            eprintln!("Error reading index: {}", e);
            std::process::exit(1);
        }
    }
}
