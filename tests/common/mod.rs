//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use goto_redirect::config::{FromToConfig, ServerConfig};
use goto_redirect::http::AppState;
use goto_redirect::net::Listener;
use goto_redirect::{RedirectServer, Shutdown};

/// A server running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.addr, target)
    }

    /// Stop the serving loop and wait for it to return.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

/// Config listening on 127.0.0.1:0 with the given explicit pairs.
pub fn config_with(pairs: &[(&str, &str)]) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.ip = "127.0.0.1".parse().unwrap();
    config.listener.port = 0;
    config.redirects.from_to = pairs
        .iter()
        .map(|(from, to)| FromToConfig {
            from: from.to_string(),
            to: to.to_string(),
        })
        .collect();
    config
}

/// Start a redirect server for `config` and return once it is accepting.
pub async fn start_server(config: ServerConfig) -> TestServer {
    let listener = Listener::bind(config.listener.bind_address()).await.unwrap();
    let addr = listener.local_addr();
    let server = RedirectServer::new(&config);
    let state = server.state().clone();
    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        server.run(listener, stop).await.unwrap();
    });

    TestServer {
        addr,
        state,
        shutdown,
        handle,
    }
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Write a tab-delimited redirect file of `(from, to)` rows.
pub fn write_redirect_file(path: &Path, rows: &[(&str, &str)]) -> PathBuf {
    let mut contents = String::from("# from\tto\tuser\tdate\n");
    for (from, to) in rows {
        contents.push_str(&format!("{}\t{}\ttester\t2019-09-07 12:00:00\n", from, to));
    }
    std::fs::write(path, contents).unwrap();
    path.to_path_buf()
}

/// Poll `check` until it holds or `within` elapses.
pub async fn eventually<F, Fut>(within: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
