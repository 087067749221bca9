//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the redirect
//! server. All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::redirects::loader::{RedirectSources, DEFAULT_FIELD_DELIMITER};

/// Root configuration for the redirect server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, read timeout).
    pub listener: ListenerConfig,

    /// Where redirect entries come from.
    pub redirects: RedirectsConfig,

    /// Request handling settings.
    pub server: HandlerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to listen on.
    pub ip: IpAddr,

    /// TCP port to listen on; 0 picks an ephemeral port.
    pub port: u16,

    /// Seconds a connection may take to send a request head.
    pub read_timeout_secs: u64,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 80,
            read_timeout_secs: 5,
        }
    }
}

/// One explicit redirect pair.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FromToConfig {
    pub from: String,
    pub to: String,
}

/// Redirect sources.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RedirectsConfig {
    /// Explicit pairs; these override file entries with the same key.
    pub from_to: Vec<FromToConfig>,

    /// Delimited redirect files (from, to, user, date).
    pub files: Vec<PathBuf>,

    /// Field delimiter for `files`; must be one ASCII character.
    pub field_delimiter: String,

    /// Reload when a redirect file changes.
    pub watch: bool,
}

impl RedirectsConfig {
    /// The delimiter as a byte, if it is a single ASCII character.
    pub fn delimiter_byte(&self) -> Option<u8> {
        let mut chars = self.field_delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Some(c as u8),
            _ => None,
        }
    }

    pub fn has_sources(&self) -> bool {
        !self.from_to.is_empty() || !self.files.is_empty()
    }

    /// Loader inputs; call after validation.
    pub fn sources(&self) -> RedirectSources {
        RedirectSources::new(
            self.from_to
                .iter()
                .map(|p| (p.from.clone(), p.to.clone()))
                .collect(),
            self.files.clone(),
            self.delimiter_byte().unwrap_or(DEFAULT_FIELD_DELIMITER as u8),
        )
    }
}

impl Default for RedirectsConfig {
    fn default() -> Self {
        Self {
            from_to: Vec::new(),
            files: Vec::new(),
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
            watch: false,
        }
    }
}

/// Request handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HandlerConfig {
    /// Path that serves the status page.
    pub status_path: String,

    /// Path that requests a reload; `None` disables reload over HTTP.
    pub reload_path: Option<String>,

    /// Status code sent with redirects.
    pub redirect_code: u16,

    /// Maximum entries in the lookup cache.
    pub cache_size: usize,

    /// Memoize lookups.
    pub cache_enabled: bool,

    /// Stop serving after this many seconds; 0 runs until interrupted.
    pub shutdown_secs: u64,
}

impl HandlerConfig {
    pub fn shutdown_after(&self) -> Option<Duration> {
        (self.shutdown_secs > 0).then(|| Duration::from_secs(self.shutdown_secs))
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            status_path: "/status".to_string(),
            reload_path: None,
            redirect_code: 308,
            cache_size: 1024,
            cache_enabled: true,
            shutdown_secs: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Debug-level logging for this crate.
    pub debug: bool,

    /// Append logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,

    /// Prometheus scrape endpoint bind address.
    pub metrics_address: Option<String>,
}
