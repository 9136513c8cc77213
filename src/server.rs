// src/server.rs
use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

/// Why the listening socket could not be opened.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("Port {port} requires elevated privileges")]
    PermissionDenied { port: u16 },

    #[error("Port {port} is already in use")]
    AddrInUse { port: u16 },

    #[error("failed to bind port {port}: {source}")]
    Other {
        port: u16,
        #[source]
        source: io::Error,
    },
}

impl BindError {
    pub fn classify(port: u16, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => BindError::PermissionDenied { port },
            io::ErrorKind::AddrInUse => BindError::AddrInUse { port },
            _ => BindError::Other { port, source },
        }
    }

    /// Errors that end the process with exit status 1 after logging.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BindError::PermissionDenied { .. } | BindError::AddrInUse { .. })
    }
}

/// Address on all interfaces for `port`.
pub fn listen_addr(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, BindError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| BindError::classify(addr.port(), e))
}

/// Serves `app` until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> io::Result<()> {
    let port = listener.local_addr()?.port();
    info!("Server listening on port: {port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
