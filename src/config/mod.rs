//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file via --config)
//!     → cli.rs (flags override file values)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!
//! On redirect file change (--watch):
//!     watcher.rs detects change
//!     → reload flag set
//!     → server rebuilds the redirect table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the redirect table is reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use cli::Cli;
pub use loader::{load_config, resolve, ConfigError};
pub use schema::{
    FromToConfig, HandlerConfig, ListenerConfig, ObservabilityConfig, RedirectsConfig,
    ServerConfig,
};
pub use validation::ValidationError;
