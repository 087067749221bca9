//! Counting of successful redirect responses.

use std::collections::BTreeMap;

use dashmap::DashMap;

/// Concurrent per-key redirect counter.
///
/// Purely observational; it never influences matching.
#[derive(Debug, Default)]
pub struct RedirectCounter {
    counts: DashMap<String, u64>,
}

impl RedirectCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one served redirect for `key`.
    pub fn increment(&self, key: &str) {
        // the shard write lock is held across the read-modify-write
        if let Some(mut count) = self.counts.get_mut(key) {
            *count += 1;
            return;
        }
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).map(|c| *c).unwrap_or(0)
    }

    /// Copy of all counts, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect()
    }
}
