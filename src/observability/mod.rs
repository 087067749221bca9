//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr or a log file
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event for machine parsing
//! - Each connection carries a connection ID span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
