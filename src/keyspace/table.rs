//! KeySpace implementation
//!
//! HashMap-based key space with a single RwLock.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

use super::{FieldMap, StoreEntry, WrongType};

/// Point-in-time copy of the whole key space
pub type Image = HashMap<Bytes, StoreEntry>;

/// Concurrent key → entry map
///
/// ## Concurrency:
/// - One `RwLock` guards the whole map
/// - Every method acquires it once and releases it on return, so callers
///   never observe an intermediate state
/// - All methods take `&self`; share with `Arc<KeySpace>`
#[derive(Default)]
pub struct KeySpace {
    entries: RwLock<HashMap<Bytes, StoreEntry>>,
}

impl KeySpace {
    /// Create an empty key space
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Key-level primitives
    // =========================================================================

    /// Copy of the entry stored at `key`
    pub fn get(&self, key: &[u8]) -> Option<StoreEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Insert or replace the entry at `key`
    pub fn put(&self, key: Bytes, entry: StoreEntry) {
        self.entries.write().insert(key, entry);
    }

    /// Remove `key`, returning whether it existed
    pub fn delete(&self, key: &[u8]) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Whether `key` exists, whatever its shape
    pub fn exists(&self, key: &[u8]) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // =========================================================================
    // Scalar operations
    // =========================================================================

    /// Scalar value at `key`
    ///
    /// - `Ok(None)`: key absent
    /// - `Err(WrongType)`: key holds a field map
    pub fn get_scalar(&self, key: &[u8]) -> Result<Option<Bytes>, WrongType> {
        match self.entries.read().get(key) {
            None => Ok(None),
            Some(StoreEntry::Scalar(value)) => Ok(Some(value.clone())),
            Some(StoreEntry::FieldMap(_)) => Err(WrongType),
        }
    }

    /// Scalar values for several keys under one read section
    ///
    /// Absent keys and field maps both come back as `None`.
    pub fn get_scalars(&self, keys: &[Bytes]) -> Vec<Option<Bytes>> {
        let entries = self.entries.read();
        keys.iter()
            .map(|key| match entries.get(key) {
                Some(StoreEntry::Scalar(value)) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Store `value` as a scalar, replacing whatever was at `key`
    pub fn put_scalar(&self, key: Bytes, value: Bytes) {
        self.put(key, StoreEntry::Scalar(value));
    }

    /// Store several scalars under one write section
    pub fn put_scalars<I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (Bytes, Bytes)>,
    {
        let mut entries = self.entries.write();
        for (key, value) in pairs {
            entries.insert(key, StoreEntry::Scalar(value));
        }
    }

    // =========================================================================
    // Multi-key operations
    // =========================================================================

    /// Remove every listed key, returning how many existed
    pub fn delete_many(&self, keys: &[Bytes]) -> usize {
        let mut entries = self.entries.write();
        keys.iter()
            .filter(|key| entries.remove(&key[..]).is_some())
            .count()
    }

    /// Count listed keys that exist (repeats are counted each time)
    pub fn count_existing(&self, keys: &[Bytes]) -> usize {
        let entries = self.entries.read();
        keys.iter()
            .filter(|key| entries.contains_key(&key[..]))
            .count()
    }

    // =========================================================================
    // Field-map operations
    // =========================================================================

    /// Value of `field` in the field map at `key`
    pub fn get_field(&self, key: &[u8], field: &[u8]) -> Result<Option<Bytes>, WrongType> {
        match self.entries.read().get(key) {
            None => Ok(None),
            Some(StoreEntry::FieldMap(fields)) => Ok(fields.get(field).cloned()),
            Some(StoreEntry::Scalar(_)) => Err(WrongType),
        }
    }

    /// Set one field, returning whether it was newly created
    pub fn put_field(&self, key: Bytes, field: Bytes, value: Bytes) -> Result<bool, WrongType> {
        self.put_fields(key, std::iter::once((field, value)))
            .map(|created| created == 1)
    }

    /// Set several fields, creating the field map if `key` is absent
    ///
    /// Returns the number of fields that did not exist before. The shape
    /// check, the presence checks and the writes share one write section;
    /// on `WrongType` nothing is modified.
    pub fn put_fields<I>(&self, key: Bytes, pairs: I) -> Result<usize, WrongType>
    where
        I: IntoIterator<Item = (Bytes, Bytes)>,
    {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key)
            .or_insert_with(|| StoreEntry::FieldMap(FieldMap::new()));

        let fields = match entry {
            StoreEntry::FieldMap(fields) => fields,
            StoreEntry::Scalar(_) => return Err(WrongType),
        };

        let mut created = 0;
        for (field, value) in pairs {
            if fields.insert(field, value).is_none() {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Remove one field, returning whether it existed
    pub fn delete_field(&self, key: &[u8], field: &Bytes) -> Result<bool, WrongType> {
        self.delete_fields(key, std::slice::from_ref(field))
            .map(|removed| removed == 1)
    }

    /// Remove listed fields, returning how many existed
    ///
    /// An absent key removes nothing. The key stays even when its last
    /// field is removed.
    pub fn delete_fields(&self, key: &[u8], fields: &[Bytes]) -> Result<usize, WrongType> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            None => Ok(0),
            Some(StoreEntry::Scalar(_)) => Err(WrongType),
            Some(StoreEntry::FieldMap(map)) => Ok(fields
                .iter()
                .filter(|field| map.remove(&field[..]).is_some())
                .count()),
        }
    }

    /// Whether `field` exists in the field map at `key`
    pub fn field_exists(&self, key: &[u8], field: &[u8]) -> Result<bool, WrongType> {
        match self.entries.read().get(key) {
            None => Ok(false),
            Some(StoreEntry::FieldMap(fields)) => Ok(fields.contains_key(field)),
            Some(StoreEntry::Scalar(_)) => Err(WrongType),
        }
    }

    // =========================================================================
    // Whole-space operations (persistence)
    // =========================================================================

    /// Point-in-time copy taken under the read lock
    pub fn image(&self) -> Image {
        self.entries.read().clone()
    }

    /// Replace the whole contents
    pub fn restore(&self, image: Image) {
        *self.entries.write() = image;
    }

    /// Remove every key
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
