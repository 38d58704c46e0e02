//! WebSocket server the Firefox extension connects back to.
//!
//! # Connection Flow
//!
//! 1. Bind to `127.0.0.1:0` and hand the URL to the launched browser
//! 2. The extension reads the URL from the init page and connects
//! 3. The extension sends READY with its initial tab id
//! 4. Commands may flow

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::Connection;
use super::connection::ReadyData;

// ============================================================================
// PendingServer
// ============================================================================

/// A bound listener still waiting for the extension.
pub struct PendingServer {
    listener: TcpListener,
    port: u16,
}

impl PendingServer {
    /// Binds to the loopback interface on an OS-assigned port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind_loopback() -> Result<Self> {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        debug!(port, "WebSocket server bound");

        Ok(Self { listener, port })
    }

    /// Returns the port the server is bound to.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns `ws://127.0.0.1:{port}`.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Accepts the extension's connection and completes the READY handshake.
    ///
    /// `wait` bounds both the TCP accept and the handshake.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if Firefox does not connect in time
    /// - [`Error::Connection`] if the WebSocket upgrade fails
    pub async fn accept(self, wait: Duration) -> Result<(Connection, ReadyData)> {
        let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);

        let (stream, addr) = timeout(wait, self.listener.accept())
            .await
            .map_err(|_| Error::connection_timeout(wait_ms))??;

        debug!(?addr, "TCP connection accepted");

        let ws_stream = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| Error::connection(format!("WebSocket upgrade failed: {e}")))?;

        info!(port = self.port, "WebSocket connection established");

        let connection = Connection::new(ws_stream);
        let ready = connection.wait_ready(wait).await?;

        Ok((connection, ready))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_loopback_assigns_port() {
        let server = PendingServer::bind_loopback().await.expect("bind");
        assert!(server.port() > 0);
        assert_eq!(server.ws_url(), format!("ws://127.0.0.1:{}", server.port()));
    }

    #[tokio::test]
    async fn test_accept_times_out_without_client() {
        let server = PendingServer::bind_loopback().await.expect("bind");
        let err = server
            .accept(Duration::from_millis(50))
            .await
            .err()
            .expect("no client connects");
        assert!(err.is_timeout());
    }
}
