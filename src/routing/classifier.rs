//! Required-modifier classification of redirect keys and incoming requests.
//!
//! # Responsibilities
//! - Classify a configured "from" path by its trailing `;`, `?` or `;?` suffix
//! - Classify an incoming request by which of params/query it carries
//! - Enumerate every table key that could serve a given request path
//! - Define the fallback order used when no exact-shape entry exists

use std::fmt;

use crate::routing::uri::UriParts;

/// Which optional URI components a redirect key requires, or a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequiredModifier {
    /// No suffix; the request has neither params nor query.
    None,
    /// Trailing `;`; the request has params.
    Param,
    /// Trailing `?`; the request has a query.
    Query,
    /// Trailing `;?`; the request has both params and query.
    ParamQuery,
}

impl RequiredModifier {
    /// All modifiers in their fixed enumeration order.
    pub const ALL: [RequiredModifier; 4] = [
        RequiredModifier::None,
        RequiredModifier::Param,
        RequiredModifier::Query,
        RequiredModifier::ParamQuery,
    ];

    /// The key suffix that selects this modifier.
    pub fn suffix(self) -> &'static str {
        match self {
            RequiredModifier::None => "",
            RequiredModifier::Param => ";",
            RequiredModifier::Query => "?",
            RequiredModifier::ParamQuery => ";?",
        }
    }

    /// Modifiers acceptable in place of `self`, in preference order.
    pub fn fallbacks(self) -> &'static [RequiredModifier] {
        match self {
            RequiredModifier::None => &[
                RequiredModifier::Param,
                RequiredModifier::Query,
                RequiredModifier::ParamQuery,
            ],
            RequiredModifier::Param | RequiredModifier::Query | RequiredModifier::ParamQuery => {
                &[RequiredModifier::None]
            }
        }
    }
}

impl fmt::Display for RequiredModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredModifier::None => "none",
            RequiredModifier::Param => "param",
            RequiredModifier::Query => "query",
            RequiredModifier::ParamQuery => "param+query",
        };
        f.write_str(name)
    }
}

/// Classify a configured "from" path by its trailing suffix.
///
/// The two-character `;?` suffix is tested before the single-character ones.
pub fn classify(path: &str) -> RequiredModifier {
    if path.ends_with(";?") {
        RequiredModifier::ParamQuery
    } else if path.ends_with('?') {
        RequiredModifier::Query
    } else if path.ends_with(';') {
        RequiredModifier::Param
    } else {
        RequiredModifier::None
    }
}

/// Classify an incoming request by which components it carries.
pub fn classify_request(parts: &UriParts) -> RequiredModifier {
    match (!parts.params.is_empty(), !parts.query.is_empty()) {
        (true, true) => RequiredModifier::ParamQuery,
        (true, false) => RequiredModifier::Param,
        (false, true) => RequiredModifier::Query,
        (false, false) => RequiredModifier::None,
    }
}

/// Every table key that could correspond to the bare request `path`.
///
/// The key for `first` is emitted first, the rest follow in the fixed
/// [`RequiredModifier::ALL`] order.
pub fn candidate_keys(path: &str, first: RequiredModifier) -> Vec<(RequiredModifier, String)> {
    std::iter::once(first)
        .chain(RequiredModifier::ALL.into_iter().filter(|m| *m != first))
        .map(|m| (m, format!("{}{}", path, m.suffix())))
        .collect()
}
