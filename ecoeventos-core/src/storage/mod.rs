//! Backing storage for the event collection.
//!
//! Reads go through [`EventStorage::load`] without locking. Every mutation
//! goes through a [`StorageTransaction`], which holds exclusive access until
//! it is dropped.

mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{StoreError, StoreResult};
use crate::event::Event;

/// How long `lock` waits before giving up, unless configured otherwise.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub trait EventStorage: Send + Sync {
    /// Snapshot of the stored events. Missing or corrupt data is an empty list.
    fn load(&self) -> Vec<Event>;

    /// Acquire exclusive access for a read-modify-write cycle.
    fn lock(&self) -> StoreResult<Box<dyn StorageTransaction + '_>>;
}

/// Exclusive access to the storage. Released on drop.
pub trait StorageTransaction {
    fn load(&mut self) -> Vec<Event>;

    /// Replace the whole stored collection.
    fn save_all(&mut self, events: &[Event]) -> StoreResult<()>;
}

/// Poll a writer mutex until `deadline`. `None` means the wait timed out.
fn lock_writer_before(writers: &Mutex<()>, deadline: Instant) -> Option<MutexGuard<'_, ()>> {
    loop {
        match writers.try_lock() {
            Ok(guard) => return Some(guard),
            // The guarded data is (), there is nothing to repair.
            Err(TryLockError::Poisoned(poisoned)) => return Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) if Instant::now() < deadline => {
                thread::sleep(LOCK_POLL_INTERVAL)
            }
            Err(TryLockError::WouldBlock) => return None,
        }
    }
}

/// Decode the persisted document, skipping anything that isn't an event.
pub(crate) fn decode_events(raw: &str) -> Vec<Event> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!("Event store is not a JSON array, treating as empty: {}", e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Skipping malformed event at index {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Pretty-printed JSON array with 4-space indentation.
pub(crate) fn encode_events(events: &[Event]) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    events
        .serialize(&mut ser)
        .map_err(|e| StoreError::Storage(format!("Could not serialize events: {e}")))?;
    buf.push(b'\n');
    Ok(buf)
}
