//! Request matching subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request target "path;params?query#fragment"
//!     → uri.rs (split into components)
//!     → classifier.rs (which modifiers the request carries)
//!     → cache.rs (memoized lookup, per table version)
//!         → matcher.rs (exact modifier first, then fallback order)
//!     → combine.rs (destination template + incoming components)
//!     → Location URL
//! ```
//!
//! # Design Decisions
//! - No regex in the hot path; candidate keys are four string lookups
//! - Deterministic: same table and request always produce the same entry
//! - A match is never computed against a table other than the one it is
//!   cached with

pub mod cache;
pub mod classifier;
pub mod combine;
pub mod matcher;
pub mod uri;

pub use cache::{CacheStats, LookupCache};
pub use classifier::{classify, classify_request, RequiredModifier};
pub use combine::combine;
pub use matcher::find_match;
pub use uri::UriParts;
