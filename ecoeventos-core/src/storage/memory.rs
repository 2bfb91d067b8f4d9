//! In-memory storage with the same locking contract as the file store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{DEFAULT_LOCK_TIMEOUT, EventStorage, StorageTransaction, lock_writer_before};
use crate::error::{StoreError, StoreResult};
use crate::event::Event;

/// Writers are serialized by `writers` with a bounded wait. `events` is only
/// held while copying, so reads never wait for an open transaction.
pub struct MemoryStorage {
    events: Mutex<Vec<Event>>,
    writers: Mutex<()>,
    lock_timeout: Duration,
    fail_writes: AtomicBool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::with_events(Vec::new())
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        MemoryStorage {
            events: Mutex::new(events),
            writers: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Make every subsequent `save_all` fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn snapshot(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventStorage for MemoryStorage {
    fn load(&self) -> Vec<Event> {
        self.snapshot().clone()
    }

    fn lock(&self) -> StoreResult<Box<dyn StorageTransaction + '_>> {
        let deadline = Instant::now() + self.lock_timeout;
        let writer = lock_writer_before(&self.writers, deadline).ok_or_else(|| {
            StoreError::Storage(format!(
                "Timed out after {}ms waiting for the in-memory store lock",
                self.lock_timeout.as_millis()
            ))
        })?;

        Ok(Box::new(MemoryTransaction {
            storage: self,
            _writer: writer,
        }))
    }
}

struct MemoryTransaction<'a> {
    storage: &'a MemoryStorage,
    _writer: MutexGuard<'a, ()>,
}

impl StorageTransaction for MemoryTransaction<'_> {
    fn load(&mut self) -> Vec<Event> {
        self.storage.load()
    }

    fn save_all(&mut self, events: &[Event]) -> StoreResult<()> {
        if self.storage.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("write rejected".to_string()));
        }
        *self.storage.snapshot() = events.to_vec();
        Ok(())
    }
}
