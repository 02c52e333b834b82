//! Request definitions
//!
//! A command invocation as sent by clients: an array of bulk strings whose
//! first element is the verb.

use bytes::Bytes;

use super::Value;

/// A parsed command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Verb exactly as sent (case preserved)
    pub verb: Bytes,

    /// Arguments following the verb
    pub args: Vec<Bytes>,
}

impl Request {
    pub fn new(verb: impl Into<Bytes>, args: Vec<Bytes>) -> Self {
        Self {
            verb: verb.into(),
            args,
        }
    }

    /// Build a request from whitespace-free words (client side)
    pub fn from_words<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut parts = words
            .into_iter()
            .map(|w| Bytes::copy_from_slice(w.as_ref()));
        let verb = parts.next()?;
        Some(Self {
            verb,
            args: parts.collect(),
        })
    }

    /// Interpret a decoded frame as a request
    ///
    /// Only a non-empty array whose elements are all present bulk strings
    /// is a command; anything else yields `None` and is skipped.
    pub fn from_value(value: Value) -> Option<Self> {
        let items = match value {
            Value::Array(items) => items,
            _ => return None,
        };

        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::BulkString(Some(b)) => parts.push(b),
                _ => return None,
            }
        }

        let mut parts = parts.into_iter();
        let verb = parts.next()?;
        Some(Self {
            verb,
            args: parts.collect(),
        })
    }

    /// Wire form: array of bulk strings, verb first
    pub fn into_value(self) -> Value {
        let mut items = Vec::with_capacity(1 + self.args.len());
        items.push(Value::BulkString(Some(self.verb)));
        items.extend(self.args.into_iter().map(|a| Value::BulkString(Some(a))));
        Value::Array(items)
    }

    /// Verb upper-cased for table lookup
    pub fn verb_upper(&self) -> String {
        String::from_utf8_lossy(&self.verb).to_ascii_uppercase()
    }
}
