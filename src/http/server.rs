//! HTTP server setup and the serving loop.
//!
//! # Responsibilities
//! - Build the Axum router with the dispatcher and middleware
//! - Hold the shared state every request reads
//! - Accept connections, one task each
//! - Act on reload requests by publishing a new table
//! - Stop on shutdown

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::http::{HeaderValue, StatusCode};
use axum::Router;
use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::sync::broadcast;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::dispatch::dispatch;
use crate::http::headers::{self, REDIRECT_SERVER_HOST, REDIRECT_SERVER_VERSION};
use crate::http::pages::PROGRAM_VERSION;
use crate::lifecycle::reload::ReloadFlag;
use crate::net::{serve_connection, Listener, ListenerError};
use crate::observability::metrics;
use crate::redirects::counter::RedirectCounter;
use crate::redirects::loader::{self, RedirectSources};
use crate::redirects::table::RedirectTable;
use crate::routing::cache::LookupCache;

/// How often the serving loop checks the reload flag without a wakeup.
const RELOAD_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// One published table version and the cache built against it.
#[derive(Debug)]
pub struct RedirectContext {
    pub table: RedirectTable,
    pub cache: LookupCache,
    pub loaded_at: NaiveDateTime,
}

impl RedirectContext {
    pub fn new(table: RedirectTable, cache_size: usize, cache_enabled: bool) -> Self {
        Self {
            table,
            cache: LookupCache::new(cache_size, cache_enabled),
            loaded_at: loader::now(),
        }
    }
}

/// Request handling settings fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub status_path: String,
    pub reload_path: Option<String>,
    pub redirect_code: StatusCode,
    pub read_timeout: Duration,
    pub cache_size: usize,
    pub cache_enabled: bool,
}

impl Settings {
    pub fn from_config(config: &ServerConfig) -> Self {
        let redirect_code = StatusCode::from_u16(config.server.redirect_code).unwrap_or_else(|_| {
            tracing::warn!(code = config.server.redirect_code, "Invalid redirect code, using 308");
            StatusCode::PERMANENT_REDIRECT
        });
        Self {
            status_path: config.server.status_path.clone(),
            reload_path: config.server.reload_path.clone(),
            redirect_code,
            read_timeout: config.listener.read_timeout(),
            cache_size: config.server.cache_size,
            cache_enabled: config.server.cache_enabled,
        }
    }
}

/// State shared by the serving loop and every request.
#[derive(Debug)]
pub struct Shared {
    pub context: ArcSwap<RedirectContext>,
    pub counter: RedirectCounter,
    pub reload: Arc<ReloadFlag>,
    pub settings: Settings,
    pub sources: RedirectSources,
    pub hostname: String,
    pub started_at: NaiveDateTime,
    pub started: Instant,
    pub listen_addr: OnceLock<SocketAddr>,
}

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState(pub Arc<Shared>);

impl std::ops::Deref for AppState {
    type Target = Shared;

    fn deref(&self) -> &Shared {
        &self.0
    }
}

impl AppState {
    pub fn new(settings: Settings, sources: RedirectSources, table: RedirectTable) -> Self {
        metrics::set_entries(table.len());
        let context = RedirectContext::new(table, settings.cache_size, settings.cache_enabled);
        Self(Arc::new(Shared {
            context: ArcSwap::from_pointee(context),
            counter: RedirectCounter::new(),
            reload: Arc::new(ReloadFlag::new()),
            settings,
            sources,
            hostname: headers::server_hostname(),
            started_at: loader::now(),
            started: Instant::now(),
            listen_addr: OnceLock::new(),
        }))
    }

    /// The table version currently served.
    pub fn current(&self) -> Arc<RedirectContext> {
        self.context.load_full()
    }

    /// Publish `table` with an empty cache; readers switch atomically.
    pub fn publish(&self, table: RedirectTable) {
        let entries = table.len();
        let fresh = RedirectContext::new(table, self.settings.cache_size, self.settings.cache_enabled);
        let old = self.context.swap(Arc::new(fresh));
        old.cache.clear();
        metrics::record_reload(entries);
        tracing::info!(entries, "Redirect table published");
    }

    /// Re-read every source and publish the result.
    pub async fn reload(&self) {
        tracing::info!("Reloading redirects");
        let sources = self.sources.clone();
        match tokio::task::spawn_blocking(move || sources.load()).await {
            Ok(table) => self.publish(table),
            Err(e) => tracing::error!(error = %e, "Reload task failed; keeping current table"),
        }
    }
}

/// HTTP redirect server.
pub struct RedirectServer {
    router: Router,
    state: AppState,
}

impl RedirectServer {
    /// Load the redirect table from `config` and build the server.
    pub fn new(config: &ServerConfig) -> Self {
        let sources = config.redirects.sources();
        let table = sources.load();
        Self::with_table(config, sources, table)
    }

    /// Build the server around an already loaded table.
    pub fn with_table(config: &ServerConfig, sources: RedirectSources, table: RedirectTable) -> Self {
        let state = AppState::new(Settings::from_config(config), sources, table);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let host = headers::latin1_header_value(&state.hostname)
            .unwrap_or_else(|| HeaderValue::from_static("localhost"));
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(REDIRECT_SERVER_HOST, host))
            .layer(SetResponseHeaderLayer::overriding(
                REDIRECT_SERVER_VERSION,
                HeaderValue::from_static(PROGRAM_VERSION),
            ))
            .layer(TraceLayer::new_for_http())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shared flag that requests a reload when set.
    pub fn reload_flag(&self) -> Arc<ReloadFlag> {
        Arc::clone(&self.state.reload)
    }

    /// The request router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind `addr` and serve until `shutdown` fires.
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let listener = Listener::bind(addr).await?;
        self.run(listener, shutdown).await
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr();
        let _ = self.state.listen_addr.set(addr);
        let read_timeout = self.state.settings.read_timeout;
        let reload = Arc::clone(&self.state.reload);

        tracing::info!(
            address = %addr,
            status_path = %self.state.settings.status_path,
            reload_path = ?self.state.settings.reload_path,
            "HTTP server starting"
        );

        let mut poll = tokio::time::interval(RELOAD_POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let app = self.router.clone();
                        tokio::spawn(serve_connection(stream, peer, app, read_timeout));
                    }
                    Err(e) => tracing::warn!(error = %e, "Accept failed"),
                },
                _ = reload.notified() => {}
                _ = poll.tick() => {}
                _ = shutdown.recv() => break,
            }

            if reload.take() {
                self.state.reload().await;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
