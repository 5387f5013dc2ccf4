//! Metadata index over a memory bank.
//!
//! The index is a JSON array of [`MetadataIndexEntry`] kept in memory by an
//! [`IndexStore`] and persisted to `.index/metadata.json` under the bank root.
//! It is built by a full scan and then maintained file by file:
//!
//! - [`IndexStore::build_index`] rescans everything (one build at a time)
//! - [`IndexStore::update_entry`] / [`IndexStore::remove_entry`] touch one file
//! - [`IndexStore::trigger_auto_rebuild`] debounces background rebuilds
//!
//! # Example
//!
//! ```no_run
//! use membank_core::index::{IndexSettings, IndexStore};
//!
//! # async fn run() -> Result<(), membank_core::index::IndexError> {
//! let store = IndexStore::open(IndexSettings::new("memory-bank"));
//! store.initialize().await?;
//!
//! let entry = store.update_entry("activeContext.md").await?;
//! println!("{} ({} words)", entry.display_title(), entry.file_metrics.word_count);
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod error;
pub mod events;
pub mod guard;
pub mod infer;
pub mod metrics;
pub mod scheduler;
pub mod store;
pub mod types;

pub use entry::{EntryFactory, build_entry, iso_timestamp};
pub use error::IndexError;
pub use events::{ChangeNotifier, IndexEvent, Listener, ListenerError, ListenerId};
pub use guard::{BuildGuard, BuildPermit};
pub use infer::infer_file_type;
pub use metrics::{compute_metrics, format_size};
pub use scheduler::RebuildScheduler;
pub use store::{DEFAULT_INDEX_PATH, IndexSettings, IndexStore, compute_stats};
pub use types::{
    FileMetrics, IndexRebuildResult, IndexStats, MetadataIndexEntry, RebuildFailure,
    ValidationStatus,
};
