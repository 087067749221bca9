//! Command-line options.
//!
//! Every flag is optional so that an omitted flag leaves the value from the
//! config file (or the built-in default) untouched.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::schema::{FromToConfig, ServerConfig};

/// Redirect GET and HEAD requests according to a table of redirect entries
#[derive(Parser, Debug, Default)]
#[command(name = "goto-redirect", version, about)]
pub struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        action = ArgAction::Append,
        help = "Redirect file of (from, to, user, date) rows (repeatable)",
        long_help = r"Redirect file of delimited rows:
    - fields: from, to, created-by user, created date (YYYY-MM-DD HH:MM:SS)
    - lines whose first field starts with '#' are ignored
    - re-read on every reload
Examples:
    - /hr	http://hr.local/login	bob	2019-09-07 12:00:00
    - /b?	http://bt.local/view?id=${query}	bob	2019-09-07"
    )]
    pub redirects: Vec<PathBuf>,

    #[arg(
        long = "from-to",
        num_args = 2,
        value_names = ["FROM", "TO"],
        action = ArgAction::Append,
        help = "Redirect FROM path to TO URL (repeatable); overrides files"
    )]
    pub from_to: Vec<String>,

    /// IP address to listen on
    #[arg(short, long)]
    pub ip: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path that serves the status page
    #[arg(long, value_name = "PATH")]
    pub status_path: Option<String>,

    /// Path that triggers a reload of the redirect files
    #[arg(long, value_name = "PATH")]
    pub reload_path: Option<String>,

    /// HTTP status code sent with redirects
    #[arg(long, value_name = "CODE")]
    pub redirect_code: Option<u16>,

    /// Field delimiter of redirect files (default: tab)
    #[arg(long, value_name = "CHAR")]
    pub field_delimiter: Option<String>,

    /// Maximum number of cached lookups
    #[arg(long, value_name = "N")]
    pub cache_size: Option<usize>,

    /// Disable the lookup cache
    #[arg(long)]
    pub no_cache: bool,

    /// Seconds a client may take to send its request
    #[arg(long, value_name = "SECS")]
    pub read_timeout: Option<u64>,

    /// Stop the server after this many seconds
    #[arg(long, value_name = "SECS")]
    pub shutdown: Option<u64>,

    /// Reload when a redirect file changes
    #[arg(long)]
    pub watch: bool,

    /// Append logs to this file
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    pub debug: bool,

    /// Serve Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// `--from-to` values as pairs.
    pub fn from_to_pairs(&self) -> Vec<FromToConfig> {
        self.from_to
            .chunks_exact(2)
            .map(|pair| FromToConfig {
                from: pair[0].clone(),
                to: pair[1].clone(),
            })
            .collect()
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut ServerConfig) {
        config.redirects.files.extend(self.redirects.iter().cloned());
        config.redirects.from_to.extend(self.from_to_pairs());
        if let Some(d) = &self.field_delimiter {
            config.redirects.field_delimiter = d.clone();
        }
        config.redirects.watch |= self.watch;

        if let Some(ip) = self.ip {
            config.listener.ip = ip;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(secs) = self.read_timeout {
            config.listener.read_timeout_secs = secs;
        }

        if let Some(p) = &self.status_path {
            config.server.status_path = p.clone();
        }
        if let Some(p) = &self.reload_path {
            config.server.reload_path = Some(p.clone());
        }
        if let Some(code) = self.redirect_code {
            config.server.redirect_code = code;
        }
        if let Some(size) = self.cache_size {
            config.server.cache_size = size;
        }
        if self.no_cache {
            config.server.cache_enabled = false;
        }
        if let Some(secs) = self.shutdown {
            config.server.shutdown_secs = secs;
        }

        if let Some(log) = &self.log {
            config.observability.log_file = Some(log.clone());
        }
        config.observability.debug |= self.debug;
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_address = Some(addr.clone());
        }
    }
}
