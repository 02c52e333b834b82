//! Engine Module
//!
//! The lifecycle object that coordinates all components.
//!
//! ## Responsibilities
//! - Own the key space, the command table and the persistence manager
//! - Restore the snapshot on startup, before any request is served
//! - Execute requests
//! - Write the final snapshot exactly once on shutdown

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;

use crate::command::CommandTable;
use crate::config::Config;
use crate::error::Result;
use crate::keyspace::KeySpace;
use crate::protocol::{Request, Value};
use crate::snapshot::{Persistence, SnapshotStats};

/// The main engine
///
/// ## Concurrency Model
///
/// - Share as `Arc<Engine>`; every method takes `&self`
/// - The key space serializes access with its own RwLock: reads run in
///   parallel, each mutation holds the write lock for the whole command
/// - The snapshot thread only takes the key-space read lock while copying
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// All keys and their entries
    keyspace: Arc<KeySpace>,

    /// Verb → handler routing
    commands: CommandTable,

    /// Snapshot load/flush/shutdown
    persistence: Persistence,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const SNAPSHOT_FILENAME: &'static str = "dump.rdb";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Create the data directory
    /// 3. Load the snapshot into a fresh key space
    /// 4. Start the periodic snapshot thread
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        let snapshot_path = config.data_dir.join(Self::SNAPSHOT_FILENAME);

        let keyspace = Arc::new(KeySpace::new());
        let persistence = Persistence::open(
            &snapshot_path,
            config.snapshot_schedule,
            Arc::clone(&keyspace),
        )?;

        Ok(Self {
            config,
            keyspace,
            commands: CommandTable::new(),
            persistence,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Execute a decoded frame
    ///
    /// Returns `None` when the frame is not a command (not an array of
    /// bulk strings); such frames get no reply.
    pub fn execute(&self, frame: Value) -> Option<Value> {
        let request = Request::from_value(frame)?;
        tracing::trace!(
            "Executing {} with {} args",
            String::from_utf8_lossy(&request.verb),
            request.args.len()
        );
        Some(self.commands.dispatch(&self.keyspace, &request))
    }

    /// Execute a verb and its arguments
    pub fn dispatch(&self, verb: &[u8], args: &[&[u8]]) -> Value {
        let request = Request::new(
            Bytes::copy_from_slice(verb),
            args.iter().map(|a| Bytes::copy_from_slice(a)).collect(),
        );
        self.commands.dispatch(&self.keyspace, &request)
    }

    /// Write a snapshot now
    pub fn flush(&self) -> Result<SnapshotStats> {
        self.persistence.flush()
    }

    /// Stop periodic snapshots and write the final one
    ///
    /// Safe to call from any thread; only the first call writes.
    pub fn shutdown(&self) -> Result<Option<SnapshotStats>> {
        self.persistence.shutdown()
    }

    /// Close the engine gracefully
    pub fn close(self) -> Result<()> {
        self.shutdown()?;
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the snapshot file path
    pub fn snapshot_path(&self) -> PathBuf {
        self.persistence.path().to_path_buf()
    }

    /// Get the key space
    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    /// Get the number of keys
    pub fn key_count(&self) -> usize {
        self.keyspace.len()
    }

    /// Get the command table
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
