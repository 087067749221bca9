//! Bounded lookup cache in front of the matcher.
//!
//! # Responsibilities
//! - Memoize `find_match` results keyed by the raw `path;params?query` text
//! - Cache negative results (no match) as well as positive ones
//! - Evict oldest-inserted keys first once capacity is exceeded
//!
//! # Design Decisions
//! - One cache per table version; a reload publishes a fresh cache with the
//!   fresh table, so a hit can never come from a replaced table
//! - Lookup runs outside the lock; a racing double insert is last-write-wins
//! - A single mutex guards map and insertion order together so the size
//!   bound holds under any interleaving

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::redirects::entry::RedirectEntry;
use crate::redirects::table::RedirectTable;
use crate::routing::matcher::find_match;
use crate::routing::uri::UriParts;

/// Cached match result; `None` records a miss.
type Cached = Option<Arc<RedirectEntry>>;

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<String, Cached>,
    order: VecDeque<String>,
}

/// Point-in-time cache counters for the status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub enabled: bool,
    pub len: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe FIFO-bounded memo of matcher results.
#[derive(Debug)]
pub struct LookupCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LookupCache {
    /// Create a cache holding at most `capacity` keys.
    ///
    /// A zero capacity disables caching.
    pub fn new(capacity: usize, enabled: bool) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity,
            enabled: enabled && capacity > 0,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the match for `raw_key`, computing and remembering it on a miss.
    pub fn find_match(
        &self,
        raw_key: &str,
        incoming: &UriParts,
        table: &RedirectTable,
    ) -> Option<Arc<RedirectEntry>> {
        if !self.enabled {
            return find_match(raw_key, incoming, table);
        }

        if let Some(cached) = self.lock().map.get(raw_key).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            crate::observability::metrics::record_cache_lookup(true);
            tracing::trace!(key = %raw_key, found = cached.is_some(), "Lookup cache hit");
            return cached;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        crate::observability::metrics::record_cache_lookup(false);
        let result = find_match(raw_key, incoming, table);
        self.insert(raw_key, result.clone());
        result
    }

    fn insert(&self, raw_key: &str, value: Cached) {
        let mut inner = self.lock();
        if let Some(slot) = inner.map.get_mut(raw_key) {
            *slot = value;
            return;
        }
        inner.map.insert(raw_key.to_string(), value);
        inner.order.push_back(raw_key.to_string());
        while inner.map.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                    tracing::trace!(key = %oldest, "Lookup cache evicted");
                }
                None => break,
            }
        }
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            len: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
