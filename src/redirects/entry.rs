//! A single configured redirect.

use chrono::NaiveDateTime;

use crate::routing::classifier::{classify, RequiredModifier};
use crate::routing::uri::UriParts;

/// Format used for `Redirect-Created-Date` and the status page.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One redirect rule: "from" key → destination template, plus record-keeping fields.
///
/// Parsed forms and the required modifier are derived once in [`RedirectEntry::new`]
/// and cannot be changed independently of the strings they come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectEntry {
    source_path: String,
    destination: String,
    created_by: String,
    created_at: NaiveDateTime,
    source_parts: UriParts,
    destination_parts: UriParts,
    required_modifier: RequiredModifier,
}

impl RedirectEntry {
    pub fn new(
        source_path: impl Into<String>,
        destination: impl Into<String>,
        created_by: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        let source_path = source_path.into();
        let destination = destination.into();
        Self {
            source_parts: UriParts::parse(&source_path),
            destination_parts: UriParts::parse(&destination),
            required_modifier: classify(&source_path),
            source_path,
            destination,
            created_by: created_by.into(),
            created_at,
        }
    }

    /// The table key, including any modifier suffix.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// The destination URL template.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn source_parts(&self) -> &UriParts {
        &self.source_parts
    }

    pub fn destination_parts(&self) -> &UriParts {
        &self.destination_parts
    }

    pub fn required_modifier(&self) -> RequiredModifier {
        self.required_modifier
    }

    /// `created_at` as sent in the `Redirect-Created-Date` header.
    pub fn created_at_display(&self) -> String {
        self.created_at.format(CREATED_AT_FORMAT).to_string()
    }
}
