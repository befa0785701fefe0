//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router for the configured role
//! - Wire up middleware (request ID, tracing)
//! - Serve until the shutdown broadcast fires
//! - Own the latency prober task on the host tier

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderName,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::config::{ProxyConfig, Role};
use crate::health::LatencyProber;
use crate::http::backend::{backend_handler, browser_headers, BackendState};
use crate::http::client::{backend_client, origin_client};
use crate::http::host::{host_handler, HostState};
use crate::http::logs::logs_handler;
use crate::http::request::X_REQUEST_ID;
use crate::load_balancer::{BackendPool, WeightTable};
use crate::observability::Journal;
use crate::rewrite::{ContentRewriter, Interceptor};

/// Failure while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("no role configured")]
    MissingRole,

    #[error("invalid rewrite rule: {0}")]
    Rewrite(#[from] regex::Error),

    #[error("failed to build origin client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),
}

/// Role-specific pieces the server keeps after building the router.
enum Tier {
    Host { prober: LatencyProber, table: Arc<WeightTable> },
    Backend,
}

/// HTTP server for either tier.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    tier: Tier,
}

impl HttpServer {
    /// Create a server for `config.role`.
    pub fn new(config: ProxyConfig, journal: Arc<Journal>) -> Result<Self, ServerError> {
        let role = config.role.ok_or(ServerError::MissingRole)?;
        let (router, tier) = match role {
            Role::Host => Self::host_router(&config, journal)?,
            Role::Backend => Self::backend_router(&config, journal)?,
        };

        Ok(Self {
            router: Self::with_layers(router),
            config,
            tier,
        })
    }

    fn host_router(config: &ProxyConfig, journal: Arc<Journal>) -> Result<(Router, Tier), ServerError> {
        let pool = Arc::new(BackendPool::from_addresses(&config.host.backends));
        let table = pool.table().clone();
        let client = backend_client(&config.timeouts);

        let prober = LatencyProber::new(
            table.clone(),
            config.host.probe.clone(),
            client.clone(),
            journal,
        );

        let state = HostState {
            pool,
            client,
            timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Router::new()
            .route("/", any(host_handler))
            .route("/{*path}", any(host_handler))
            .with_state(state);

        Ok((router, Tier::Host { prober, table }))
    }

    fn backend_router(config: &ProxyConfig, journal: Arc<Journal>) -> Result<(Router, Tier), ServerError> {
        let backend = &config.backend;
        let parse = |url: &str| {
            Url::parse(url).map_err(|source| ServerError::InvalidUrl {
                url: url.to_string(),
                source,
            })
        };

        let rewriter = Arc::new(ContentRewriter::from_config(backend)?);
        let state = BackendState {
            config: Arc::new(backend.clone()),
            target: Arc::new(parse(&backend.target_url)?),
            asset_origin: Arc::new(parse(&backend.asset_origin_url)?),
            client: origin_client(&config.timeouts)?,
            interceptor: Interceptor::new(rewriter, journal.clone()),
            journal,
            browser_headers: Arc::new(browser_headers(backend)?),
        };

        let router = Router::new()
            .route("/logs", get(logs_handler))
            .route("/", any(backend_handler))
            .route("/{*path}", any(backend_handler))
            .with_state(state);

        Ok((router, Tier::Backend))
    }

    fn with_layers(router: Router) -> Router {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let role = self.config.role;
        tracing::info!(address = %addr, role = ?role, "HTTP server starting");

        let prober_task = match self.tier {
            Tier::Host { prober, .. } => Some(tokio::spawn(prober.run(shutdown.resubscribe()))),
            Tier::Backend => None,
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        if let Some(task) = prober_task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Latency prober task failed");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The host tier's weight table, if this is a host server.
    pub fn weight_table(&self) -> Option<Arc<WeightTable>> {
        match &self.tier {
            Tier::Host { table, .. } => Some(table.clone()),
            Tier::Backend => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn journal() -> (Arc<Journal>, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("tandem-server-{}.log", uuid::Uuid::new_v4()));
        (Arc::new(Journal::open(&path).await.unwrap()), path)
    }

    #[tokio::test]
    async fn test_missing_role_rejected() {
        let (journal, path) = journal().await;
        let result = HttpServer::new(ProxyConfig::default(), journal);
        assert!(matches!(result, Err(ServerError::MissingRole)));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_host_server_exposes_weight_table() {
        let (journal, path) = journal().await;
        let mut config = ProxyConfig::default();
        config.role = Some(Role::Host);

        let server = HttpServer::new(config, journal).unwrap();
        let table = server.weight_table().unwrap();
        assert_eq!(table.pool().len(), 3);
        assert!(table.snapshot().iter().all(|(_, w)| *w == 1));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_backend_server_rejects_bad_target() {
        let (journal, path) = journal().await;
        let mut config = ProxyConfig::default();
        config.role = Some(Role::Backend);
        config.backend.target_url = "not a url".into();

        let result = HttpServer::new(config, journal);
        assert!(matches!(result, Err(ServerError::InvalidUrl { .. })));
        let _ = std::fs::remove_file(path);
    }
}
