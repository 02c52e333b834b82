//! Protocol codec
//!
//! Encoding and decoding functions for the RESP wire format.
//!
//! ## Wire Format
//!
//! ```text
//! +<text>\r\n                  simple string
//! -<text>\r\n                  error
//! :<decimal>\r\n               integer
//! $<len>\r\n<bytes>\r\n        bulk string ($-1\r\n = absent)
//! *<count>\r\n<element>...     array
//! _\r\n                        null
//! ```
//!
//! Decoding reads from any `BufRead` and blocks until one complete frame is
//! available. Encoding is pure and never fails.

use std::io::{self, BufRead, Read, Write};

use bytes::Bytes;

use super::Value;
use crate::error::{EmberError, Result};

pub const SIMPLE_STRING: u8 = b'+';
pub const ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK_STRING: u8 = b'$';
pub const ARRAY: u8 = b'*';
pub const NULL: u8 = b'_';

const CRLF: &[u8] = b"\r\n";

/// Largest accepted bulk string payload (512 MiB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest accepted header/simple line, excluding CRLF
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Deepest accepted array nesting
pub const MAX_DEPTH: usize = 32;

/// Outcome of reading one frame from a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete value
    Value(Value),

    /// Leading byte is not a RESP type marker; nothing else was consumed
    Unsupported(u8),

    /// Stream ended cleanly before a new frame started
    Eof,
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to its wire bytes
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

/// Append the wire bytes of `value` to `out`
pub fn encode_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::SimpleString(text) => {
            out.push(SIMPLE_STRING);
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(CRLF);
        }
        Value::Error(text) => {
            out.push(ERROR);
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(CRLF);
        }
        Value::Integer(n) => {
            out.push(INTEGER);
            out.extend_from_slice(n.to_string().as_bytes());
            out.extend_from_slice(CRLF);
        }
        Value::BulkString(Some(payload)) => {
            out.push(BULK_STRING);
            out.extend_from_slice(payload.len().to_string().as_bytes());
            out.extend_from_slice(CRLF);
            out.extend_from_slice(payload);
            out.extend_from_slice(CRLF);
        }
        Value::BulkString(None) => out.extend_from_slice(b"$-1\r\n"),
        Value::Array(items) => {
            out.push(ARRAY);
            out.extend_from_slice(items.len().to_string().as_bytes());
            out.extend_from_slice(CRLF);
            for item in items {
                encode_into(item, out);
            }
        }
        Value::Null => {
            out.push(NULL);
            out.extend_from_slice(CRLF);
        }
    }
}

/// Encode a value and write it to a stream
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    writer.write_all(&encode(value))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Decoding
// =============================================================================

/// Read one frame from a stream
///
/// Blocks until a complete frame or the end of the stream is observed.
/// A malformed or truncated frame is an `EmberError::Protocol`.
pub fn decode<R: BufRead>(reader: &mut R) -> Result<Frame> {
    let marker = match read_marker(reader)? {
        Some(marker) => marker,
        None => return Ok(Frame::Eof),
    };

    if !is_marker(marker) {
        return Ok(Frame::Unsupported(marker));
    }

    decode_body(reader, marker, 0).map(Frame::Value)
}

fn is_marker(byte: u8) -> bool {
    matches!(
        byte,
        SIMPLE_STRING | ERROR | INTEGER | BULK_STRING | ARRAY | NULL
    )
}

fn decode_body<R: BufRead>(reader: &mut R, marker: u8, depth: usize) -> Result<Value> {
    match marker {
        SIMPLE_STRING => Ok(Value::SimpleString(read_text(reader)?)),
        ERROR => Ok(Value::Error(read_text(reader)?)),
        INTEGER => Ok(Value::Integer(read_decimal(reader)?)),
        BULK_STRING => read_bulk(reader),
        ARRAY => read_array(reader, depth),
        NULL => {
            let line = read_line(reader)?;
            if !line.is_empty() {
                return Err(protocol("null frame carries a payload"));
            }
            Ok(Value::Null)
        }
        other => Err(protocol(format!("unexpected type byte 0x{:02x}", other))),
    }
}

fn read_array<R: BufRead>(reader: &mut R, depth: usize) -> Result<Value> {
    if depth >= MAX_DEPTH {
        return Err(protocol(format!("array nesting deeper than {}", MAX_DEPTH)));
    }

    let count = read_decimal(reader)?;
    if count < 0 {
        return Err(protocol(format!("invalid array length {}", count)));
    }

    // Cap the pre-allocation; the count is client-controlled
    let mut items = Vec::with_capacity((count as usize).min(1024));
    for _ in 0..count {
        let marker = read_marker(reader)?.ok_or_else(|| truncated("array element"))?;
        items.push(decode_body(reader, marker, depth + 1)?);
    }

    Ok(Value::Array(items))
}

fn read_bulk<R: BufRead>(reader: &mut R) -> Result<Value> {
    let len = read_decimal(reader)?;
    if len == -1 {
        return Ok(Value::BulkString(None));
    }
    if len < 0 {
        return Err(protocol(format!("invalid bulk length {}", len)));
    }

    let len = len as usize;
    if len > MAX_BULK_LEN {
        return Err(protocol(format!(
            "bulk length {} exceeds maximum {}",
            len, MAX_BULK_LEN
        )));
    }

    let mut payload = Vec::with_capacity(len.min(64 * 1024));
    let read = reader.by_ref().take(len as u64).read_to_end(&mut payload)?;
    if read < len {
        return Err(truncated("bulk payload"));
    }

    let mut crlf = [0u8; 2];
    reader
        .read_exact(&mut crlf)
        .map_err(|e| eof_as_truncated(e, "bulk terminator"))?;
    if crlf != *b"\r\n" {
        return Err(protocol("bulk payload not followed by CRLF"));
    }

    Ok(Value::BulkString(Some(Bytes::from(payload))))
}

/// Read a single byte, `None` on clean end of stream
fn read_marker<R: BufRead>(reader: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read up to CRLF, returning the line without it
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    reader
        .by_ref()
        .take((MAX_LINE_LEN + CRLF.len()) as u64)
        .read_until(b'\n', &mut line)?;

    if !line.ends_with(b"\n") {
        if line.len() > MAX_LINE_LEN {
            return Err(protocol(format!("line longer than {} bytes", MAX_LINE_LEN)));
        }
        return Err(truncated("line"));
    }
    if !line.ends_with(CRLF) {
        return Err(protocol("expected CRLF line terminator"));
    }

    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

fn read_text<R: BufRead>(reader: &mut R) -> Result<String> {
    let line = read_line(reader)?;
    String::from_utf8(line).map_err(|_| protocol("line is not valid UTF-8"))
}

fn read_decimal<R: BufRead>(reader: &mut R) -> Result<i64> {
    let line = read_line(reader)?;
    std::str::from_utf8(&line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            protocol(format!(
                "invalid decimal '{}'",
                String::from_utf8_lossy(&line)
            ))
        })
}

fn protocol(message: impl Into<String>) -> EmberError {
    EmberError::Protocol(message.into())
}

fn truncated(what: &str) -> EmberError {
    protocol(format!("unexpected end of stream while reading {}", what))
}

fn eof_as_truncated(e: io::Error, what: &str) -> EmberError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        truncated(what)
    } else {
        EmberError::Io(e)
    }
}
