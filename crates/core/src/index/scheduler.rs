//! Debounced rebuild scheduling.
//!
//! Rapid change signals collapse into one delayed run: every call to
//! [`RebuildScheduler::schedule`] cancels the pending timer and starts a new
//! one, so only the last call within the window fires.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Single-slot, cancel-then-schedule timer.
#[derive(Debug)]
pub struct RebuildScheduler {
    delay: Duration,
    enabled: bool,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl RebuildScheduler {
    pub fn new(delay: Duration, enabled: bool) -> Self {
        Self { delay, enabled, pending: Mutex::new(None) }
    }

    /// Run `task` once the delay elapses with no further calls.
    ///
    /// Returns `false` when scheduling is disabled or no tokio runtime is
    /// available; the task is then dropped without running.
    pub fn schedule<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.enabled {
            return false;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Rebuild requested outside of a tokio runtime; ignoring");
            return false;
        };

        let delay = self.delay;
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached: cancel stops the timer, never a run in progress.
            tokio::spawn(task);
        }));
        true
    }

    /// Cancel the pending run, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RebuildScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner).take()
        {
            handle.abort();
        }
    }
}
