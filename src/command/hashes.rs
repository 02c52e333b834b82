//! Field-map commands
//!
//! Each handler makes a single key-space call, so the shape check and any
//! mutation happen in the same lock section.

use bytes::Bytes;

use crate::keyspace::{KeySpace, WrongType};
use crate::protocol::Value;

/// HSET key field value [field value ...]
pub(super) fn hset(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    let (key, rest) = (&args[0], &args[1..]);
    let pairs = rest
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()));

    match keyspace.put_fields(key.clone(), pairs) {
        Ok(created) => Value::count(created),
        Err(WrongType) => Value::wrong_type(),
    }
}

/// HGET key field
pub(super) fn hget(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    match keyspace.get_field(&args[0], &args[1]) {
        Ok(value) => Value::bulk_or_null(value),
        Err(WrongType) => Value::wrong_type(),
    }
}

/// HDEL key field [field ...]
pub(super) fn hdel(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    match keyspace.delete_fields(&args[0], &args[1..]) {
        Ok(removed) => Value::count(removed),
        Err(WrongType) => Value::wrong_type(),
    }
}

/// HEXISTS key field
pub(super) fn hexists(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    match keyspace.field_exists(&args[0], &args[1]) {
        Ok(present) => Value::Integer(present as i64),
        Err(WrongType) => Value::wrong_type(),
    }
}
