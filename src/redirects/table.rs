//! The redirect table: source key → entry.
//!
//! # Design Decisions
//! - Built once per load, never mutated after publication
//! - Entries are reference counted so lookups and caches share them cheaply
//! - Ordered by key for deterministic listing

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::redirects::entry::RedirectEntry;

/// Immutable mapping from `source_path` to [`RedirectEntry`].
#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    entries: BTreeMap<String, Arc<RedirectEntry>>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under its own key; a later insert for the same key wins.
    pub fn insert(&mut self, entry: RedirectEntry) {
        self.entries
            .insert(entry.source_path().to_string(), Arc::new(entry));
    }

    pub fn remove(&mut self, key: &str) -> Option<Arc<RedirectEntry>> {
        self.entries.remove(key)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&RedirectEntry) -> bool) {
        self.entries.retain(|_, entry| keep(entry));
    }

    /// Merge `other` into `self`; entries from `other` overwrite same-keyed ones.
    pub fn extend(&mut self, other: RedirectTable) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, key: &str) -> Option<&Arc<RedirectEntry>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(key, entry)` pairs in key order.
    pub fn snapshot(&self) -> impl Iterator<Item = (&str, &Arc<RedirectEntry>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<RedirectEntry> for RedirectTable {
    fn from_iter<I: IntoIterator<Item = RedirectEntry>>(iter: I) -> Self {
        let mut table = RedirectTable::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}
