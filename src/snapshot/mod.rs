//! Snapshot Module
//!
//! Durability for the key space through whole-space snapshots.
//!
//! ## Responsibilities
//! - Load the snapshot into the key space at boot
//! - Re-write the snapshot on a fixed interval from a background thread
//! - Write one final snapshot at shutdown, then stop the background thread
//! - Never expose a half-written file: write to a temporary file, fsync,
//!   rename over the snapshot, fsync the directory
//!
//! ## File Format
//! ```text
//! ┌──────────┬────────────┬──────────┬───────────────┬──────────────────┐
//! │Magic (4) │Version (2) │ CRC (4)  │ Payload len(8)│ Payload (bincode)│
//! └──────────┴────────────┴──────────┴───────────────┴──────────────────┘
//! ```
//! The payload is a key-sorted map, so equal key spaces always produce
//! identical bytes. An empty file is an empty key space.

mod file;
mod flusher;
mod format;
mod manager;

pub use file::SnapshotFile;
pub use flusher::Flusher;
pub use format::{decode_image, encode_image};
pub use manager::{Persistence, SnapshotStats};

/// File magic: "EKVS"
pub const MAGIC: &[u8; 4] = b"EKVS";

/// Current format version
pub const VERSION: u16 = 1;

/// Magic + version + crc + payload length
pub const HEADER_SIZE: usize = 4 + 2 + 4 + 8;
