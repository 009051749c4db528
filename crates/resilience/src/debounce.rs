// crates/resilience/src/debounce.rs
//! Trailing-edge debouncing keyed by logical channel
//!
//! Each key has at most one pending task. Scheduling again for the same key
//! aborts the pending task and restarts the quiet window, so only the last
//! request of a burst runs. Nothing runs on the leading edge.
//!
//! Once the quiet window elapses the task detaches from the debouncer: a later
//! `schedule` or `cancel` no longer aborts work that has already started.

use crate::error::{ResilienceError, ResilienceResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Reference quiet window for keystroke-driven work
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug)]
struct Slot {
    ticket: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct Slots {
    next_ticket: u64,
    pending: HashMap<&'static str, Slot>,
}

fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delays and coalesces bursts of work per key.
///
/// Dropping the debouncer cancels every pending task.
#[derive(Debug, Default)]
pub struct Debouncer {
    slots: Arc<Mutex<Slots>>,
}

impl Debouncer {
    /// Creates an empty debouncer
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run after `delay` unless `key` is scheduled again first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: &'static str, delay: Duration, task: F) -> ResilienceResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| ResilienceError::NoRuntime)?;

        // The lock is held until the new slot is inserted so the spawned task
        // always finds its own ticket when the delay is zero.
        let mut slots = lock(&self.slots);
        slots.next_ticket += 1;
        let ticket = slots.next_ticket;

        if let Some(previous) = slots.pending.remove(key) {
            previous.handle.abort();
            log::trace!("Debounce '{}': superseded pending task", key);
        }

        let shared = Arc::clone(&self.slots);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut slots = lock(&shared);
                match slots.pending.get(key) {
                    Some(slot) if slot.ticket == ticket => {
                        slots.pending.remove(key);
                    }
                    _ => return,
                }
            }

            log::trace!("Debounce '{}': quiet window elapsed, running task", key);
            task.await;
        });

        slots.pending.insert(key, Slot { ticket, handle });
        Ok(())
    }

    /// Cancels the pending task for `key`; returns true if one was pending
    pub fn cancel(&self, key: &str) -> bool {
        match lock(&self.slots).pending.remove(key) {
            Some(slot) => {
                slot.handle.abort();
                log::trace!("Debounce '{}': cancelled", key);
                true
            }
            None => false,
        }
    }

    /// Cancels every pending task
    pub fn cancel_all(&self) {
        for (_, slot) in lock(&self.slots).pending.drain() {
            slot.handle.abort();
        }
    }

    /// Returns true if a task for `key` is waiting for its quiet window
    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.slots).pending.contains_key(key)
    }

    /// Number of keys with a pending task
    pub fn pending_count(&self) -> usize {
        lock(&self.slots).pending.len()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
