//! Persistence Manager
//!
//! Ties the key space, the snapshot file and the background flusher
//! together and owns the shutdown sequence.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Flusher, SnapshotFile};
use crate::config::SnapshotSchedule;
use crate::error::Result;
use crate::keyspace::KeySpace;

/// Outcome of one snapshot write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Keys captured
    pub keys: usize,

    /// File size in bytes
    pub bytes: usize,
}

/// Snapshot the key space: copy under the read lock, then write the copy
pub(crate) fn persist(keyspace: &KeySpace, file: &SnapshotFile) -> Result<SnapshotStats> {
    let image = keyspace.image();
    let bytes = file.store(&image)?;
    Ok(SnapshotStats {
        keys: image.len(),
        bytes,
    })
}

/// Durability for one key space
///
/// ## Lifecycle
/// 1. `open`: load the snapshot into the key space, start the flusher
/// 2. periodic snapshots on the flusher thread
/// 3. `shutdown`: stop the flusher, write a final snapshot (runs once)
pub struct Persistence {
    keyspace: Arc<KeySpace>,
    file: Arc<SnapshotFile>,
    flusher: Mutex<Option<Flusher>>,
    shut_down: AtomicBool,
}

impl Persistence {
    /// Restore `keyspace` from the snapshot at `path` and start flushing
    ///
    /// A missing or empty snapshot gives an empty key space. A snapshot that
    /// cannot be opened or decoded is an error.
    pub fn open(path: &Path, schedule: SnapshotSchedule, keyspace: Arc<KeySpace>) -> Result<Self> {
        let file = Arc::new(SnapshotFile::open(path)?);

        let image = file.load()?;
        let restored = image.len();
        keyspace.restore(image);
        tracing::info!("Loaded {} keys from {}", restored, path.display());

        let flusher = match schedule.period() {
            Some(period) => Some(Flusher::spawn(
                period,
                Arc::clone(&keyspace),
                Arc::clone(&file),
            )?),
            None => None,
        };

        Ok(Self {
            keyspace,
            file,
            flusher: Mutex::new(flusher),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Write a snapshot now
    pub fn flush(&self) -> Result<SnapshotStats> {
        persist(&self.keyspace, &self.file)
    }

    /// Stop periodic snapshots and write the final one
    ///
    /// Only the first call does anything; later calls return `Ok(None)`.
    pub fn shutdown(&self) -> Result<Option<SnapshotStats>> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }

        if let Some(flusher) = self.flusher.lock().take() {
            flusher.stop();
        }

        let stats = self.flush()?;
        tracing::info!(
            "Final snapshot written: {} keys, {} bytes to {}",
            stats.keys,
            stats.bytes,
            self.file.path().display()
        );
        Ok(Some(stats))
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Snapshot path
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for Persistence {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("Final snapshot on drop failed: {}", e);
        }
    }
}
