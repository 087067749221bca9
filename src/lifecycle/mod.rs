//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Reload (reload.rs):
//!     signal / reload path / file watcher → flag set
//!     → serving loop takes flag → new table published
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C / SIGTERM / timer → broadcast → stop accepting → exit
//!
//! Signals (signals.rs):
//!     SIGUSR1 → reload flag
//!     SIGINT/SIGTERM → shutdown
//! ```
//!
//! # Design Decisions
//! - Signal handlers do minimal work: set a bit or send a broadcast
//! - Reload never interrupts requests already in flight

pub mod reload;
pub mod shutdown;
pub mod signals;

pub use reload::ReloadFlag;
pub use shutdown::Shutdown;
