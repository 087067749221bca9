//! Per-request dispatch.
//!
//! # Data Flow
//! ```text
//! GET/HEAD request target
//!     → UriParts::parse
//!     → path == status path?  → 200 status page
//!     → path == reload path?  → 202, reload flag set
//!     → cached lookup         → redirect code + Location, or 404
//! other methods               → 501
//! ```
//!
//! HEAD runs the same logic as GET; the body is dropped, headers are kept.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Response;

use crate::http::headers::{
    latin1_header_value, CREATED_BY_FALLBACK, REDIRECT_CREATED_BY, REDIRECT_CREATED_DATE,
};
use crate::http::pages::{self, StatusReport};
use crate::http::server::{AppState, Settings};
use crate::lifecycle::signals::RELOAD_SIGNAL;
use crate::observability::metrics;
use crate::redirects::loader;
use crate::routing::combine::combine;
use crate::routing::uri::UriParts;

/// What a request path asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Status,
    Reload,
    Redirect,
}

/// Decide by the path component alone; params, query and fragment are ignored.
pub fn target(settings: &Settings, path: &str) -> Target {
    if path == settings.status_path {
        Target::Status
    } else if settings.reload_path.as_deref() == Some(path) {
        Target::Reload
    } else {
        Target::Redirect
    }
}

/// Fallback handler for every request.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let head = match method {
        Method::GET => false,
        Method::HEAD => true,
        _ => {
            tracing::info!(method = %method, peer = ?peer, "Method not implemented");
            return html(StatusCode::NOT_IMPLEMENTED, pages::not_implemented_page(method.as_str()));
        }
    };

    let raw = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let incoming = UriParts::parse(raw);
    tracing::debug!(method = %method, target = %raw, peer = ?peer, "Request");

    let response = match target(&state.settings, &incoming.path) {
        Target::Status => status(&state),
        Target::Reload => reload(&state),
        Target::Redirect => redirect(&state, &incoming),
    };

    if head {
        let (parts, _) = response.into_parts();
        Response::from_parts(parts, Body::empty())
    } else {
        response
    }
}

fn status(state: &AppState) -> Response {
    let context = state.current();
    let report = StatusReport {
        pid: std::process::id(),
        listen: state.listen_addr.get().copied(),
        hostname: &state.hostname,
        started_at: state.started_at,
        uptime: state.started.elapsed(),
        redirect_code: state.settings.redirect_code,
        counter: state.counter.snapshot(),
        reloaded_at: context.loaded_at,
        table: &context.table,
        cache: context.cache.stats(),
        files: &state.sources.files,
        reload_signal: RELOAD_SIGNAL,
        reload_path: state.settings.reload_path.as_deref(),
    };
    tracing::info!("Status requested");
    html(StatusCode::OK, pages::status_page(&report))
}

fn reload(state: &AppState) -> Response {
    tracing::info!("Reload requested over HTTP");
    state.reload.request();
    html(StatusCode::ACCEPTED, pages::reload_page(loader::now()))
}

fn redirect(state: &AppState, incoming: &UriParts) -> Response {
    let context = state.current();
    let key = incoming.path_params_query();

    let Some(entry) = context.cache.find_match(&key, incoming, &context.table) else {
        tracing::info!(path = %incoming.path, "No redirect found");
        metrics::record_not_found();
        return html(StatusCode::NOT_FOUND, pages::not_found_page(&incoming.path));
    };

    let to = combine(entry.destination_parts(), incoming);
    let Some(location) = latin1_header_value(&to) else {
        tracing::error!(from = %entry.source_path(), to = %to, "Combined URL is not a valid header value");
        metrics::record_not_found();
        return html(StatusCode::NOT_FOUND, pages::not_found_page(&incoming.path));
    };

    let created_by = latin1_header_value(entry.created_by()).unwrap_or_else(|| {
        tracing::warn!(from = %entry.source_path(), "Redirect-Created-By set to fallback");
        HeaderValue::from_static(CREATED_BY_FALLBACK)
    });

    let mut response = Response::new(Body::empty());
    *response.status_mut() = state.settings.redirect_code;
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.insert(REDIRECT_CREATED_BY, created_by);
    if let Ok(date) = HeaderValue::from_str(&entry.created_at_display()) {
        headers.insert(REDIRECT_CREATED_DATE, date);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));

    state.counter.increment(entry.source_path());
    metrics::record_redirect();
    tracing::info!(
        from = %entry.source_path(),
        to = %to,
        code = %state.settings.redirect_code,
        "Redirect found"
    );

    response
}

fn html(status: StatusCode, document: String) -> Response {
    let length = HeaderValue::from(document.len());
    let mut response = Response::new(Body::from(document));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CONTENT_LENGTH, length);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FromToConfig, ServerConfig};
    use crate::http::headers::{REDIRECT_SERVER_HOST, REDIRECT_SERVER_VERSION};
    use crate::http::server::RedirectServer;
    use tower::ServiceExt;

    fn server(pairs: &[(&str, &str)], reload_path: Option<&str>) -> RedirectServer {
        let mut config = ServerConfig::default();
        config.server.reload_path = reload_path.map(str::to_string);
        config.redirects.from_to = pairs
            .iter()
            .map(|(f, t)| FromToConfig {
                from: f.to_string(),
                to: t.to_string(),
            })
            .collect();
        RedirectServer::new(&config)
    }

    async fn send(server: &RedirectServer, method: Method, uri: &str) -> Response {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        server.router().oneshot(request).await.unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn target_ignores_everything_but_path() {
        let mut config = ServerConfig::default();
        config.server.reload_path = Some("/reload".into());
        let settings = Settings::from_config(&config);
        assert_eq!(target(&settings, "/status"), Target::Status);
        assert_eq!(target(&settings, "/reload"), Target::Reload);
        assert_eq!(target(&settings, "/status/x"), Target::Redirect);
        assert_eq!(target(&settings, "/"), Target::Redirect);
    }

    #[tokio::test]
    async fn template_redirect() {
        let server = server(&[("/b", "http://bt.local/view?id=${query}")], None);
        let response = send(&server, Method::GET, "/b?123").await;

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        let headers = response.headers();
        assert_eq!(headers[header::LOCATION], "http://bt.local/view?id=123");
        assert!(headers.contains_key(REDIRECT_CREATED_BY));
        assert!(headers.contains_key(REDIRECT_CREATED_DATE));
        assert!(headers.contains_key(REDIRECT_SERVER_HOST));
        assert_eq!(headers[REDIRECT_SERVER_VERSION], pages::PROGRAM_VERSION);
        assert_eq!(headers[header::CONTENT_LENGTH], "0");
        assert_eq!(server.state().counter.get("/b"), 1);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let server = server(&[("/a", "http://a")], None);
        let response = send(&server, Method::GET, "/nope").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!response.headers().contains_key(header::LOCATION));
        assert!(response.headers().contains_key(REDIRECT_SERVER_HOST));
        assert!(body(response).await.contains("<code>/nope</code>"));
    }

    #[tokio::test]
    async fn head_matches_get_without_body() {
        let server = server(&[("/a", "http://a/x")], None);
        let get = send(&server, Method::GET, "/a").await;
        let head = send(&server, Method::HEAD, "/a").await;
        assert_eq!(get.status(), head.status());
        assert_eq!(get.headers()[header::LOCATION], head.headers()[header::LOCATION]);
        assert!(body(head).await.is_empty());

        let missing = send(&server, Method::HEAD, "/missing").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert!(missing.headers().contains_key(header::CONTENT_LENGTH));
        assert!(body(missing).await.is_empty());
    }

    #[tokio::test]
    async fn status_page_ignores_query() {
        let server = server(&[("/a", "http://a")], None);
        let response = send(&server, Method::GET, "/status?x=1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("Currently Loaded Redirects"));
    }

    #[tokio::test]
    async fn reload_path_sets_flag() {
        let server = server(&[("/a", "http://a")], Some("/reload"));
        assert!(!server.state().reload.is_requested());
        let response = send(&server, Method::GET, "/reload;x?y").await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(server.state().reload.is_requested());
    }

    #[tokio::test]
    async fn reload_path_disabled_by_default() {
        let server = server(&[("/a", "http://a")], None);
        let response = send(&server, Method::GET, "/reload").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!server.state().reload.is_requested());
    }

    #[tokio::test]
    async fn other_methods_are_not_implemented() {
        let server = server(&[("/a", "http://a")], None);
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let response = send(&server, method, "/a").await;
            assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
            assert!(response.headers().contains_key(REDIRECT_SERVER_VERSION));
        }
    }

    #[tokio::test]
    async fn fallback_and_params() {
        let server = server(
            &[("/a", "http://plain"), ("/a;", "http://param"), ("/q?", "http://query/${query}")],
            None,
        );
        let response = send(&server, Method::GET, "/a;x").await;
        assert_eq!(response.headers()[header::LOCATION], "http://param/;x");
        let response = send(&server, Method::GET, "/a?z=1").await;
        assert_eq!(response.headers()[header::LOCATION], "http://plain?z=1");
        // only a query-requiring entry exists; a bare request falls back to it
        let response = send(&server, Method::GET, "/q").await;
        assert_eq!(response.headers()[header::LOCATION], "http://query/");
    }
}
