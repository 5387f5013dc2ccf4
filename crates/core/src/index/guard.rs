//! At-most-one-build guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether a full build is running.
#[derive(Debug, Default, Clone)]
pub struct BuildGuard {
    building: Arc<AtomicBool>,
}

impl BuildGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the build slot, or `None` if another build holds it.
    pub fn try_acquire(&self) -> Option<BuildPermit> {
        self.building
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BuildPermit { flag: self.building.clone() })
    }

    pub fn is_building(&self) -> bool {
        self.building.load(Ordering::SeqCst)
    }
}

/// Releases the build slot when dropped, including on early return, panic,
/// or cancellation of the owning future.
#[derive(Debug)]
pub struct BuildPermit {
    flag: Arc<AtomicBool>,
}

impl Drop for BuildPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
