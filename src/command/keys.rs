//! Shape-agnostic key commands

use bytes::Bytes;

use crate::keyspace::KeySpace;
use crate::protocol::Value;

/// DEL key [key ...]
pub(super) fn del(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    Value::count(keyspace.delete_many(args))
}

/// EXISTS key [key ...]
pub(super) fn exists(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    Value::count(keyspace.count_existing(args))
}
