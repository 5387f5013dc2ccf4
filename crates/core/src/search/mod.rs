//! Filtering, ranking and pagination over index snapshots.
//!
//! Everything here is pure: the engine borrows a slice of entries, usually
//! obtained from [`IndexStore::get_index`](crate::index::IndexStore::get_index).
//!
//! # Example
//!
//! ```no_run
//! use membank_core::index::{IndexSettings, IndexStore};
//! use membank_core::search::{SearchEngine, SearchOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = IndexStore::open(IndexSettings::new("memory-bank"));
//! store.initialize().await?;
//! let entries = store.get_index()?;
//!
//! let options = SearchOptions { query: Some("brief".into()), ..Default::default() };
//! let page = SearchEngine::new(&entries).search(&options);
//! println!("{} of {} matches", page.results.len(), page.total);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod filter;
pub mod rank;

pub use engine::{DEFAULT_LIMIT, SearchEngine, SearchOptions, SearchResult};
pub use filter::{MetadataFilter, parse_date};
pub use rank::{SortBy, SortOrder, relevance_score};
