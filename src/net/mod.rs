//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept)
//!     → connection.rs (connection ID span, read timeout, HTTP codec)
//!     → Hand off to the request router
//! ```
//!
//! # Design Decisions
//! - One task per connection; no admission control
//! - A client that stalls before finishing its request head is dropped

pub mod connection;
pub mod listener;

pub use connection::{serve_connection, ConnectionId};
pub use listener::{Listener, ListenerError};
