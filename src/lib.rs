//! HTTP redirect server library.
//!
//! Answers GET and HEAD requests by looking the request path up in a table
//! of redirect entries and replying with a redirect to the entry's
//! destination, after substituting the request's own URI components into
//! the destination template.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod redirects;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::RedirectServer;
pub use lifecycle::{ReloadFlag, Shutdown};
