//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per connection
//! - Requests routed through the shared `Engine`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
