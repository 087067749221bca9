//! goto-redirect: HTTP redirect server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                 REDIRECT SERVER                  │
//!                     │                                                  │
//!   GET /b?123        │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│   net   │──▶│   http   │──▶│   routing    │   │
//!                     │  │listener │   │ dispatch │   │ cache+matcher│   │
//!                     │  └─────────┘   └────┬─────┘   └──────┬───────┘   │
//!                     │                     │                ▼           │
//!   308 Location:     │                     │         ┌──────────────┐   │
//!   ◀─────────────────┼─────────────────────┴─────────│   combine    │   │
//!                     │                               └──────────────┘   │
//!                     │  ┌────────────────────────────────────────────┐  │
//!                     │  │            Cross-Cutting Concerns          │  │
//!                     │  │ ┌────────┐ ┌───────────┐ ┌──────────────┐  │  │
//!                     │  │ │ config │ │ redirects │ │ observability│  │  │
//!                     │  │ │ + watch│ │ load/swap │ │ logs+metrics │  │  │
//!                     │  │ └────────┘ └───────────┘ └──────────────┘  │  │
//!                     │  │ ┌────────────────────────────────────────┐ │  │
//!                     │  │ │ lifecycle: reload flag, signals, stop  │ │  │
//!                     │  │ └────────────────────────────────────────┘ │  │
//!                     │  └────────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use goto_redirect::config::watcher::RedirectFileWatcher;
use goto_redirect::config::{self, Cli};
use goto_redirect::lifecycle::{signals, Shutdown};
use goto_redirect::observability::{logging, metrics};
use goto_redirect::RedirectServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::resolve(&cli)?;

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        "goto-redirect starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        files = ?config.redirects.files,
        from_to = config.redirects.from_to.len(),
        redirect_code = config.server.redirect_code,
        cache_size = config.server.cache_size,
        cache_enabled = config.server.cache_enabled,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let server = RedirectServer::new(&config);
    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();

    signals::spawn_signal_handlers(server.reload_flag(), shutdown.clone());

    // dropping the watcher stops it, so it lives until main returns
    let _watcher = if config.redirects.watch {
        match RedirectFileWatcher::new(&config.redirects.files, server.reload_flag()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::error!(error = %e, "Failed to watch redirect files");
                None
            }
        }
    } else {
        None
    };

    if let Some(after) = config.server.shutdown_after() {
        shutdown.trigger_after(after);
    }

    server.serve(config.listener.bind_address(), stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
