//! TCP listener.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//!
//! # Design Decisions
//! - No connection cap; every accepted connection gets its own task
//! - Accept errors are returned to the serving loop, which logs and continues

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to `addr`; port 0 picks an ephemeral port.
    pub async fn bind(addr: SocketAddr) -> Result<Self, ListenerError> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;
        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        tracing::trace!(peer_addr = %addr, "Connection accepted");
        Ok((stream, addr))
    }

    /// The bound address, with the real port when bound to port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ephemeral_port_is_reported() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        assert_ne!(listener.local_addr().port(), 0);

        let addr = listener.local_addr();
        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let (_stream, peer) = listener.accept().await.unwrap();
        assert!(peer.ip().is_loopback());
        client.await.unwrap();
    }

    #[tokio::test]
    async fn bind_conflict_is_an_error() {
        let first = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let err = Listener::bind(first.local_addr()).await.err().unwrap();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }
}
