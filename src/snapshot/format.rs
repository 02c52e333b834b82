//! Snapshot encoding
//!
//! Converts a key-space image to and from the on-disk byte layout.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{HEADER_SIZE, MAGIC, VERSION};
use crate::error::{EmberError, Result};
use crate::keyspace::{Image, StoreEntry};

/// Entry as written to disk; sorted maps keep the bytes deterministic
#[derive(Debug, Serialize, Deserialize)]
enum PersistedEntry {
    Scalar(Bytes),
    FieldMap(BTreeMap<Bytes, Bytes>),
}

type PersistedImage = BTreeMap<Bytes, PersistedEntry>;

impl From<&StoreEntry> for PersistedEntry {
    fn from(entry: &StoreEntry) -> Self {
        match entry {
            StoreEntry::Scalar(value) => PersistedEntry::Scalar(value.clone()),
            StoreEntry::FieldMap(fields) => PersistedEntry::FieldMap(
                fields
                    .iter()
                    .map(|(f, v)| (f.clone(), v.clone()))
                    .collect(),
            ),
        }
    }
}

impl From<PersistedEntry> for StoreEntry {
    fn from(entry: PersistedEntry) -> Self {
        match entry {
            PersistedEntry::Scalar(value) => StoreEntry::Scalar(value),
            PersistedEntry::FieldMap(fields) => StoreEntry::FieldMap(fields.into_iter().collect()),
        }
    }
}

/// Serialize an image into header + payload
pub fn encode_image(image: &Image) -> Result<Vec<u8>> {
    let sorted: PersistedImage = image
        .iter()
        .map(|(key, entry)| (key.clone(), PersistedEntry::from(entry)))
        .collect();

    let payload = bincode::serialize(&sorted)
        .map_err(|e| EmberError::Serialization(e.to_string()))?;
    let crc = crc32fast::hash(&payload);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&payload);

    Ok(bytes)
}

/// Parse header + payload back into an image
///
/// Zero bytes decode to an empty image.
pub fn decode_image(bytes: &[u8]) -> Result<Image> {
    if bytes.is_empty() {
        return Ok(Image::new());
    }

    if bytes.len() < HEADER_SIZE {
        return Err(corruption(format!(
            "file is {} bytes, shorter than the {}-byte header",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    if &bytes[0..4] != MAGIC {
        return Err(corruption("bad magic".to_string()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(corruption(format!("unsupported version {}", version)));
    }

    let stored_crc = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[10..18]);
    let payload_len = u64::from_le_bytes(len_bytes);

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() as u64 != payload_len {
        return Err(corruption(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            payload_len
        )));
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != stored_crc {
        return Err(corruption(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored_crc, actual_crc
        )));
    }

    let sorted: PersistedImage = bincode::deserialize(payload)
        .map_err(|e| corruption(format!("undecodable payload: {}", e)))?;

    Ok(sorted
        .into_iter()
        .map(|(key, entry)| (key, StoreEntry::from(entry)))
        .collect())
}

fn corruption(message: String) -> EmberError {
    EmberError::SnapshotCorruption(message)
}
