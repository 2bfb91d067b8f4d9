//! Events persisted as one JSON array on disk.

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use super::{
    DEFAULT_LOCK_TIMEOUT, EventStorage, LOCK_POLL_INTERVAL, StorageTransaction, decode_events,
    encode_events, lock_writer_before,
};
use crate::error::{StoreError, StoreResult};
use crate::event::Event;

/// JSON array file guarded by a sibling `<file>.lock`.
///
/// Writers hold both an in-process mutex and an OS advisory lock on the lock
/// file, so threads and separate processes are serialized alike. New content
/// is written to `<file>.tmp` and renamed over the data file, which means
/// readers never lock and never see a half-written document.
pub struct JsonFileStorage {
    path: PathBuf,
    lock_path: PathBuf,
    tmp_path: PathBuf,
    lock_timeout: Duration,
    writers: Mutex<()>,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        JsonFileStorage {
            lock_path: with_suffix(&path, ".lock"),
            tmp_path: with_suffix(&path, ".tmp"),
            path,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            writers: Mutex::new(()),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_events(&self) -> Vec<Event> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode_events(&raw),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn ensure_parent_dir(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Could not create {}: {e}", parent.display()))
            })?;
        }
        Ok(())
    }

    /// Write `[]` if the data file does not exist yet. Makes a single attempt
    /// at the lock; if a writer holds it, that writer creates the file.
    fn create_if_missing(&self) {
        let created = self.lock_until(Instant::now()).and_then(|mut tx| {
            if self.path.exists() {
                return Ok(false);
            }
            tx.save_all(&[]).map(|_| true)
        });

        match created {
            Ok(true) => tracing::info!("Created empty event store at {}", self.path.display()),
            Ok(false) => {}
            Err(e) => tracing::debug!("Skipped creating {}: {}", self.path.display(), e),
        }
    }

    fn acquire_writer(&self, deadline: Instant) -> StoreResult<MutexGuard<'_, ()>> {
        lock_writer_before(&self.writers, deadline).ok_or_else(|| self.timed_out())
    }

    fn acquire_file_lock(&self, deadline: Instant) -> StoreResult<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| {
                StoreError::Storage(format!("Could not open {}: {e}", self.lock_path.display()))
            })?;

        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return Ok(file),
                Err(_) if Instant::now() < deadline => thread::sleep(LOCK_POLL_INTERVAL),
                Err(_) => return Err(self.timed_out()),
            }
        }
    }

    fn timed_out(&self) -> StoreError {
        StoreError::Storage(format!(
            "Timed out after {}ms waiting for the lock on {}",
            self.lock_timeout.as_millis(),
            self.path.display()
        ))
    }

    fn lock_until(&self, deadline: Instant) -> StoreResult<FileTransaction<'_>> {
        let writer = self.acquire_writer(deadline)?;
        self.ensure_parent_dir()?;
        let lock_file = self.acquire_file_lock(deadline)?;

        Ok(FileTransaction {
            storage: self,
            lock_file,
            _writer: writer,
        })
    }

    fn write_atomically(&self, content: &[u8]) -> std::io::Result<()> {
        let mut tmp = File::create(&self.tmp_path)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.sync_all()?;
        drop(tmp);
        fs::rename(&self.tmp_path, &self.path)
    }
}

impl EventStorage for JsonFileStorage {
    fn load(&self) -> Vec<Event> {
        if !self.path.exists() {
            self.create_if_missing();
            return Vec::new();
        }
        self.read_events()
    }

    fn lock(&self) -> StoreResult<Box<dyn StorageTransaction + '_>> {
        let deadline = Instant::now() + self.lock_timeout;
        Ok(Box::new(self.lock_until(deadline)?))
    }
}

struct FileTransaction<'a> {
    storage: &'a JsonFileStorage,
    lock_file: File,
    _writer: MutexGuard<'a, ()>,
}

impl StorageTransaction for FileTransaction<'_> {
    fn load(&mut self) -> Vec<Event> {
        if !self.storage.path.exists() {
            return Vec::new();
        }
        self.storage.read_events()
    }

    fn save_all(&mut self, events: &[Event]) -> StoreResult<()> {
        let content = encode_events(events)?;

        self.storage.write_atomically(&content).map_err(|e| {
            let _ = fs::remove_file(&self.storage.tmp_path);
            StoreError::Storage(format!(
                "Could not write {}: {e}",
                self.storage.path.display()
            ))
        })
    }
}

impl Drop for FileTransaction<'_> {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock_file);
    }
}
