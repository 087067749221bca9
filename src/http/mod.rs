//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, serving loop, shared state)
//!     → dispatch.rs (status / reload / redirect / 501)
//!         → routing (lookup + combine)
//!     → headers.rs (Location encoding, identity headers)
//!     → pages.rs (HTML bodies)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod headers;
pub mod pages;
pub mod server;

pub use server::{AppState, RedirectServer, ServerError};
