//! Protocol Module
//!
//! Defines the wire protocol for client-server communication: a subset of
//! RESP (the Redis serialization protocol).
//!
//! ## Requests
//! ```text
//! *3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
//! └─┬─┘ └──────────────┬──────────────────────┘
//!  count      bulk strings: verb + arguments
//! ```
//!
//! ## Replies
//! One of the six `Value` encodings, see [`codec`].

mod value;
mod request;
pub mod codec;

pub use value::{Value, WRONGTYPE};
pub use request::Request;
pub use codec::{decode, encode, encode_into, write_value, Frame};
