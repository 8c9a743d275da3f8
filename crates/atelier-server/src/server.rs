//! TCP listener and top-level server wiring.
//!
//! Accepts connections, assigns each a process-unique [`ConnectionId`],
//! and spawns one task per connection. All shared state travels through
//! [`AppState`]; the accept loop itself owns nothing but the listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::net::TcpListener;

use crate::connection::run_connection;
use crate::error::ServerError;
use crate::registry::ConnectionId;
use crate::state::AppState;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g. "0.0.0.0:9400").
    pub bind_address: String,
    /// Maximum simultaneously connected clients.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:9400".to_owned(), max_connections: 1024 }
    }
}

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_connection_id() -> ConnectionId {
    ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// The artwork share server.
pub struct Server {
    listener: TcpListener,
    state: AppState,
    config: ServerConfig,
}

impl Server {
    /// Bind the listener.
    pub async fn bind(config: ServerConfig, state: AppState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        Ok(Self { listener, state, config })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the process is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let active = Arc::new(AtomicUsize::new(0));

        loop {
            let (stream, peer) = self.listener.accept().await?;

            if active.load(Ordering::Acquire) >= self.config.max_connections {
                tracing::warn!(%peer, limit = self.config.max_connections, "connection limit reached, rejecting");
                drop(stream);
                continue;
            }

            let conn = next_connection_id();
            tracing::info!(%conn, %peer, "connection accepted");

            active.fetch_add(1, Ordering::AcqRel);
            let active = Arc::clone(&active);
            let state = self.state.clone();

            tokio::spawn(async move {
                if let Err(err) = run_connection(conn, stream, state).await {
                    tracing::warn!(%conn, error = %err, "connection ended with error");
                }
                active.fetch_sub(1, Ordering::AcqRel);
            });
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("config", &self.config).finish_non_exhaustive()
    }
}
