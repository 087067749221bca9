//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define redirect server metrics
//! - Expose a Prometheus-compatible endpoint when configured
//!
//! # Metrics
//! - `goto_redirects_total` (counter): redirects served
//! - `goto_not_found_total` (counter): lookups with no entry
//! - `goto_reloads_total` (counter): completed table reloads
//! - `goto_cache_hits_total` / `goto_cache_misses_total` (counter): lookup cache
//! - `goto_redirect_entries` (gauge): entries in the live table
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - No per-path labels; the status page carries per-entry counts

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REDIRECTS_TOTAL: &str = "goto_redirects_total";
pub const NOT_FOUND_TOTAL: &str = "goto_not_found_total";
pub const RELOADS_TOTAL: &str = "goto_reloads_total";
pub const CACHE_HITS_TOTAL: &str = "goto_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "goto_cache_misses_total";
pub const REDIRECT_ENTRIES: &str = "goto_redirect_entries";

/// Serve Prometheus metrics on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_redirect() {
    metrics::counter!(REDIRECTS_TOTAL).increment(1);
}

pub fn record_not_found() {
    metrics::counter!(NOT_FOUND_TOTAL).increment(1);
}

pub fn record_reload(entries: usize) {
    metrics::counter!(RELOADS_TOTAL).increment(1);
    set_entries(entries);
}

pub fn set_entries(entries: usize) {
    metrics::gauge!(REDIRECT_ENTRIES).set(entries as f64);
}

pub fn record_cache_lookup(hit: bool) {
    if hit {
        metrics::counter!(CACHE_HITS_TOTAL).increment(1);
    } else {
        metrics::counter!(CACHE_MISSES_TOTAL).increment(1);
    }
}
