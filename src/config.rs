//! Configuration for EmberKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EmberError, Result};

/// Main configuration for an EmberKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the snapshot file
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── dump.rdb        (current snapshot)
    ///     └── dump.rdb.tmp    (in-flight snapshot, renamed over dump.rdb)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Snapshot Configuration
    // -------------------------------------------------------------------------
    /// When the key space is written to disk
    pub snapshot_schedule: SnapshotSchedule,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Connection read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,
}

/// Snapshot schedule: how often the whole key space is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSchedule {
    /// Snapshot every `ms` milliseconds, plus once at shutdown
    Interval { ms: u64 },

    /// Snapshot only on explicit flush and at shutdown
    OnShutdown,
}

impl SnapshotSchedule {
    /// Period of the background flusher, if any
    pub fn period(&self) -> Option<Duration> {
        match self {
            SnapshotSchedule::Interval { ms } => Some(Duration::from_millis(*ms)),
            SnapshotSchedule::OnShutdown => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./emberkv_data"),
            snapshot_schedule: SnapshotSchedule::Interval { ms: 1000 },
            listen_addr: "127.0.0.1:6379".to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(EmberError::Config("data_dir must not be empty".to_string()));
        }
        if let SnapshotSchedule::Interval { ms: 0 } = self.snapshot_schedule {
            return Err(EmberError::Config(
                "snapshot interval must be greater than zero".to_string(),
            ));
        }
        if self.listen_addr.trim().is_empty() {
            return Err(EmberError::Config("listen_addr must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (where the snapshot lives)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the snapshot schedule
    pub fn snapshot_schedule(mut self, schedule: SnapshotSchedule) -> Self {
        self.config.snapshot_schedule = schedule;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
