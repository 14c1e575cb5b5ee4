//! Listener setup and the serve loop.
//!
//! Startup is split in two so the caller learns about a taken port before
//! anything else is torn down:
//!
//! 1. [`bind`] resolves `server.host`/`server.port` and opens the socket.
//! 2. [`serve`] runs the router on that socket until `shutdown` resolves.
//!
//! Spectator streams never end on their own, so [`serve`] cancels
//! [`AppState::closing`] as soon as `shutdown` fires. Open streams then
//! finish, and the graceful drain can complete.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use sweeper_core::config::ServerSettings;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Open the listening socket described by `settings`.
///
/// # Errors
///
/// [`ServerError::Address`] when host and port do not form a socket
/// address, [`ServerError::Bind`] when the socket cannot be opened.
pub async fn bind(settings: &ServerSettings) -> Result<TcpListener, ServerError> {
    let raw = format!("{}:{}", settings.host, settings.port);
    let addr: SocketAddr = raw
        .parse()
        .map_err(|source| ServerError::Address { raw, source })?;

    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve the API on `listener` until `shutdown` resolves.
///
/// After `shutdown` fires no new connections are accepted, open spectator
/// streams are ended, and in-flight requests are allowed to finish.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr().map_err(ServerError::Serve)?;
    let closing = state.closing.clone();
    let router = build_router(state);

    info!(addr = %local, "Sweeper API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Draining connections");
            closing.cancel();
        })
        .await
        .map_err(ServerError::Serve)?;

    info!("Sweeper API stopped");
    Ok(())
}

/// Failures while opening the listener or serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// `host:port` is not a socket address.
    #[error("invalid listen address {raw:?}: {source}")]
    Address {
        /// The rejected `host:port` text.
        raw: String,
        /// Parser error.
        source: std::net::AddrParseError,
    },

    /// The socket could not be opened.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        /// Address we tried to bind.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}
