//! # EmberKV
//!
//! A small Redis-compatible key-value server with:
//! - RESP wire protocol over TCP
//! - String keys and hash (field map) keys
//! - Point-in-time snapshots for durability
//! - Concurrent clients over one shared key space
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (Thread per connection)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  RESP frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Command Table                              │
//! │             (verb → arity check → handler)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐   image    ┌─────────────┐
//!               │   KeySpace    │──────────► │  Snapshot   │
//!               │   (RwLock)    │ ◄───────── │ (dump.rdb)  │
//!               └───────────────┘  restore   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod keyspace;
pub mod command;
pub mod snapshot;
pub mod network;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EmberError, Result};
pub use config::{Config, SnapshotSchedule};
pub use engine::Engine;
pub use protocol::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
