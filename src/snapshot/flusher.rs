//! Background flusher
//!
//! Periodically snapshots the key space until told to stop.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};

use super::manager::persist;
use super::SnapshotFile;
use crate::error::Result;
use crate::keyspace::KeySpace;

/// Handle to the periodic snapshot thread
pub struct Flusher {
    /// Wakes the thread and tells it to exit
    stop_tx: Sender<()>,

    handle: JoinHandle<()>,
}

impl Flusher {
    /// Spawn the flusher thread
    ///
    /// A failed snapshot is logged and retried on the next tick; the
    /// in-memory key space stays authoritative.
    pub fn spawn(period: Duration, keyspace: Arc<KeySpace>, file: Arc<SnapshotFile>) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("snapshot-flusher".into())
            .spawn(move || {
                tracing::debug!("Snapshot flusher started, period {:?}", period);
                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            match persist(&keyspace, &file) {
                                Ok(stats) => tracing::trace!(
                                    "Periodic snapshot: {} keys, {} bytes",
                                    stats.keys,
                                    stats.bytes
                                ),
                                Err(e) => tracing::warn!("Periodic snapshot failed: {}", e),
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("Snapshot flusher stopped");
            })?;

        Ok(Self { stop_tx, handle })
    }

    /// Stop the thread and wait for it; no tick runs after this returns
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            tracing::warn!("Snapshot flusher thread panicked");
        }
    }
}
