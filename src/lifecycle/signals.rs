//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe); handlers only flip the reload
//!   flag or fire the shutdown broadcast
//! - SIGUSR1 (Unix) or Ctrl-Break (Windows) requests a reload, not shutdown
//! - Ctrl-C (and SIGTERM on Unix) triggers shutdown

use std::sync::Arc;

use crate::lifecycle::reload::ReloadFlag;
use crate::lifecycle::shutdown::Shutdown;

/// Name of the reload signal on this platform, for the status page.
#[cfg(unix)]
pub const RELOAD_SIGNAL: Option<&str> = Some("SIGUSR1");
#[cfg(windows)]
pub const RELOAD_SIGNAL: Option<&str> = Some("CTRL_BREAK_EVENT");
#[cfg(not(any(unix, windows)))]
pub const RELOAD_SIGNAL: Option<&str> = None;

/// Spawn the signal listeners. Failure to register is logged, not fatal.
pub fn spawn_signal_handlers(reload: Arc<ReloadFlag>, shutdown: Shutdown) {
    spawn_reload_listener(reload);

    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                on_interrupt.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                if term.recv().await.is_some() {
                    tracing::info!("SIGTERM received, shutting down");
                    shutdown.trigger();
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    });
}

#[cfg(unix)]
fn spawn_reload_listener(reload: Arc<ReloadFlag>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut usr1 = match signal(SignalKind::user_defined1()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGUSR1 handler");
                return;
            }
        };
        while usr1.recv().await.is_some() {
            tracing::info!("SIGUSR1 received, requesting reload");
            reload.request();
        }
    });
}

#[cfg(windows)]
fn spawn_reload_listener(reload: Arc<ReloadFlag>) {
    tokio::spawn(async move {
        let mut brk = match tokio::signal::windows::ctrl_break() {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl-Break handler");
                return;
            }
        };
        while brk.recv().await.is_some() {
            tracing::info!("Ctrl-Break received, requesting reload");
            reload.request();
        }
    });
}

#[cfg(not(any(unix, windows)))]
fn spawn_reload_listener(_reload: Arc<ReloadFlag>) {
    tracing::info!("No reload signal on this platform; use the reload path");
}
