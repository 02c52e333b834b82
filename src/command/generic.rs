//! Connection-level commands

use bytes::Bytes;

use crate::keyspace::KeySpace;
use crate::protocol::Value;

/// PING [message]
pub(super) fn ping(_keyspace: &KeySpace, args: &[Bytes]) -> Value {
    match args.first() {
        None => Value::simple("PONG"),
        Some(message) => Value::bulk(message.clone()),
    }
}

/// COMMAND [...]
///
/// Interactive clients probe this on connect; answering OK keeps them happy.
pub(super) fn command(_keyspace: &KeySpace, _args: &[Bytes]) -> Value {
    Value::ok()
}
