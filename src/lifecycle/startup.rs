//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the log store (fatal on failure)
//! - Start the metrics exporter when enabled
//! - Bind the listener, build the server, serve until a signal arrives

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::Shutdown;
use crate::observability::{metrics, Journal};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to open log file {path}: {source}")]
    Journal {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the configured tier until SIGINT/SIGTERM.
pub async fn start(config: ProxyConfig) -> Result<(), StartupError> {
    let journal = Journal::open(&config.journal.path)
        .await
        .map_err(|source| StartupError::Journal {
            path: config.journal.path.clone(),
            source,
        })?;
    let journal = Arc::new(journal);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    tracing::info!(
        role = ?config.role,
        address = %config.listener.bind_address,
        log_file = %config.journal.path,
        "Configuration loaded"
    );

    let server = HttpServer::new(config, journal)?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, receiver).await.map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
