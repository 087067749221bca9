//! Redirect entry matching.
//!
//! # Responsibilities
//! - Find the entry whose required modifier matches the request's shape
//! - Fall back to a less specific entry when no exact shape exists
//! - Report an explicit no-match rather than a default
//!
//! # Design Decisions
//! - At most four table lookups per request (one per modifier)
//! - Exact-shape match short-circuits before any fallback bookkeeping
//! - Unresolvable candidates are logged at error level: they indicate a
//!   configuration that can never be reached by this request shape

use std::sync::Arc;

use crate::redirects::entry::RedirectEntry;
use crate::redirects::table::RedirectTable;
use crate::routing::classifier::{candidate_keys, classify_request, RequiredModifier};
use crate::routing::uri::UriParts;

/// Find the best entry in `table` for the incoming request.
///
/// `raw` is the request's `path;params?query` text and is only used for logging.
pub fn find_match(
    raw: &str,
    incoming: &UriParts,
    table: &RedirectTable,
) -> Option<Arc<RedirectEntry>> {
    let requested = classify_request(incoming);
    let candidates = candidate_keys(&incoming.path, requested);

    let mut present: Vec<(RequiredModifier, &Arc<RedirectEntry>)> = Vec::new();
    for (modifier, key) in &candidates {
        if let Some(entry) = table.get(key) {
            if entry.required_modifier() == requested {
                tracing::trace!(request = %raw, key = %key, "Exact modifier match");
                return Some(Arc::clone(entry));
            }
            present.push((*modifier, entry));
        }
    }

    if present.is_empty() {
        return None;
    }

    for fallback in requested.fallbacks() {
        if let Some((_, entry)) = present.iter().find(|(m, _)| m == fallback) {
            tracing::debug!(
                request = %raw,
                requested = %requested,
                matched = %entry.source_path(),
                "Fallback modifier match"
            );
            return Some(Arc::clone(entry));
        }
    }

    tracing::error!(
        request = %raw,
        requested = %requested,
        candidates = ?present.iter().map(|(_, e)| e.source_path()).collect::<Vec<_>>(),
        "Redirect candidates exist but none accept this request shape"
    );
    None
}
