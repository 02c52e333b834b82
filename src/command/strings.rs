//! Scalar commands

use bytes::Bytes;

use crate::keyspace::{KeySpace, WrongType};
use crate::protocol::Value;

/// SET key value
pub(super) fn set(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    keyspace.put_scalar(args[0].clone(), args[1].clone());
    Value::ok()
}

/// GET key
pub(super) fn get(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    match keyspace.get_scalar(&args[0]) {
        Ok(value) => Value::bulk_or_null(value),
        Err(WrongType) => Value::wrong_type(),
    }
}

/// MSET key value [key value ...]
pub(super) fn mset(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    keyspace.put_scalars(
        args.chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone())),
    );
    Value::ok()
}

/// MGET key [key ...]
///
/// Keys holding a field map read as misses rather than errors.
pub(super) fn mget(keyspace: &KeySpace, args: &[Bytes]) -> Value {
    Value::Array(
        keyspace
            .get_scalars(args)
            .into_iter()
            .map(Value::bulk_or_null)
            .collect(),
    )
}
