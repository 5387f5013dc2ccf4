//! Broadcast of index mutations to registered listeners.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::types::{IndexStats, MetadataIndexEntry};

/// A change to the index.
#[derive(Debug, Clone)]
pub enum IndexEvent {
    EntryAdded(MetadataIndexEntry),
    EntryUpdated(MetadataIndexEntry),
    EntryRemoved { relative_path: String },
    IndexRebuilt(IndexStats),
    IndexError { message: String },
}

impl IndexEvent {
    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EntryAdded(_) => "entry_added",
            Self::EntryUpdated(_) => "entry_updated",
            Self::EntryRemoved { .. } => "entry_removed",
            Self::IndexRebuilt(_) => "index_rebuilt",
            Self::IndexError { .. } => "index_error",
        }
    }
}

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Callback receiving index events. Errors are logged and otherwise ignored.
pub type Listener = dyn Fn(&IndexEvent) -> Result<(), ListenerError> + Send + Sync;

/// Handle returned by [`ChangeNotifier::add_listener`], used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Multi-listener broadcast with per-listener failure isolation.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Arc<Listener>)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&IndexEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Deliver `event` to every listener.
    ///
    /// A listener that errors or panics is logged and skipped; the rest
    /// still receive the event.
    pub fn emit(&self, event: &IndexEvent) {
        // Snapshot so listeners may (de)register while being called.
        let listeners: Vec<Arc<Listener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        for listener in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Index listener failed on {}: {}", event.kind(), e);
                }
                Err(_) => {
                    tracing::warn!("Index listener panicked on {}", event.kind());
                }
            }
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier").field("listeners", &self.listener_count()).finish()
    }
}
