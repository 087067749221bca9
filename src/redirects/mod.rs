//! Redirect data subsystem.
//!
//! # Data Flow
//! ```text
//! --from-to pairs + redirect files
//!     → loader.rs (read rows, merge, clean)
//!     → table.rs (immutable RedirectTable of entry.rs values)
//!     → published by the server as one atomically swapped snapshot
//!
//! Per served redirect:
//!     → counter.rs (per-key counts for the status page)
//! ```
//!
//! # Design Decisions
//! - Entries and tables are never mutated after publication; a reload builds
//!   a new table and replaces the old one wholesale
//! - Loading never fails as a whole; bad rows and files are logged and skipped

pub mod counter;
pub mod entry;
pub mod loader;
pub mod table;

pub use counter::RedirectCounter;
pub use entry::RedirectEntry;
pub use loader::{LoadError, RedirectSources};
pub use table::RedirectTable;
