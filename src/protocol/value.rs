//! Value definitions
//!
//! The wire-level unit shared by the codec and the command engine.

use bytes::Bytes;

/// Reply text for a shape mismatch between command and stored entry
pub const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// A RESP value
///
/// Arrays carry both inbound commands (array of bulk strings) and
/// composite replies such as MGET results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `+text`
    SimpleString(String),

    /// `-text`
    Error(String),

    /// `:n`
    Integer(i64),

    /// `$len` + payload; `None` is the absent bulk string (`$-1`)
    BulkString(Option<Bytes>),

    /// `*count` + elements
    Array(Vec<Value>),

    /// `_`
    Null,
}

impl Value {
    /// The `+OK` reply
    pub fn ok() -> Self {
        Value::SimpleString("OK".to_string())
    }

    /// A simple string reply
    pub fn simple(text: impl Into<String>) -> Self {
        Value::SimpleString(text.into())
    }

    /// An error reply
    pub fn error(text: impl Into<String>) -> Self {
        Value::Error(text.into())
    }

    /// A present bulk string
    pub fn bulk(payload: impl Into<Bytes>) -> Self {
        Value::BulkString(Some(payload.into()))
    }

    /// Bulk string when present, `Null` otherwise
    pub fn bulk_or_null(payload: Option<Bytes>) -> Self {
        match payload {
            Some(p) => Value::BulkString(Some(p)),
            None => Value::Null,
        }
    }

    /// Integer reply from a count
    pub fn count(n: usize) -> Self {
        Value::Integer(n as i64)
    }

    /// The shared WRONGTYPE error
    pub fn wrong_type() -> Self {
        Value::Error(WRONGTYPE.to_string())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}
