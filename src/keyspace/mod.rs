//! KeySpace Module
//!
//! The in-memory key space: the only shared mutable state in the server.
//!
//! ## Responsibilities
//! - Map each key to exactly one typed entry (scalar or field map)
//! - Keep an entry's shape fixed for as long as its key exists
//! - Make every operation atomic: check-and-mutate sequences run inside a
//!   single lock section
//!
//! ## Data Structure Choice
//! `HashMap` behind one `parking_lot::RwLock`. Reads take the shared mode,
//! anything that creates, deletes or mutates takes the exclusive mode for the
//! whole logical operation.

mod table;

use std::collections::HashMap;

use bytes::Bytes;
use thiserror::Error;

pub use table::{Image, KeySpace};

/// Field name → field value
pub type FieldMap = HashMap<Bytes, Bytes>;

/// Entry stored under a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEntry {
    /// A single byte string
    Scalar(Bytes),

    /// Named sub-fields
    FieldMap(FieldMap),
}

impl StoreEntry {
    pub fn is_scalar(&self) -> bool {
        matches!(self, StoreEntry::Scalar(_))
    }

    pub fn is_field_map(&self) -> bool {
        matches!(self, StoreEntry::FieldMap(_))
    }
}

/// The key holds the other entry shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation against a key holding the wrong kind of value")]
pub struct WrongType;
