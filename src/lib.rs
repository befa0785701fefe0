//! Two-tier content-rewriting reverse proxy.
//!
//! A host tier spreads client traffic over a pool of backend instances,
//! weighted by periodically probed latency. Each backend instance proxies one
//! fixed origin with browser-like headers and rewrites origin URLs inside HTML
//! so the proxied site stays usable through the proxy.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod rewrite;

pub use config::schema::{ProxyConfig, Role};
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Journal;
