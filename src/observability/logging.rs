//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Choose the log destination (stderr or an append-mode file)
//! - Configure log level from flags and the environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the level chosen by `--debug`
//! - File output never carries ANSI colour codes

use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "goto_redirect=debug,tower_http=debug"
    } else {
        "goto_redirect=info,tower_http=info"
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(config: &ObservabilityConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(config.debug).into());

    let file = match &config.log_file {
        Some(path) => Some(open_log_file(path)?),
        None => None,
    };

    let (stderr_layer, file_layer) = match file {
        Some(file) => (
            None,
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
        ),
        None => (Some(fmt::layer().with_writer(std::io::stderr)), None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Ok(())
}

fn open_log_file(path: &std::path::Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_raises_crate_level() {
        assert!(default_filter(true).starts_with("goto_redirect=debug"));
        assert!(default_filter(false).starts_with("goto_redirect=info"));
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        let config = ObservabilityConfig {
            log_file: Some("/no/such/dir/goto.log".into()),
            ..Default::default()
        };
        assert!(init(&config).is_err());
    }
}
