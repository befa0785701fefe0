//! Content rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Origin response (backend tier)
//!     → interceptor.rs (status 403? → journal the body)
//!     → interceptor.rs (Content-Type contains text/html?)
//!         yes → buffer body → encoding.rs (undo Content-Encoding)
//!             → rules.rs (origin → http://<Host>,
//!                         asset origin → /static or asset proxy)
//!             → drop Content-Encoding, Content-Length = rewritten length
//!         no  → stream body unchanged
//!     → Client
//! ```
//!
//! # Design Decisions
//! - Replacement is literal substring based, not HTML aware: the origin URL is
//!   also rewritten inside scripts, comments and attribute fragments
//! - HTML bodies are buffered whole; other bodies stream through untouched,
//!   still compressed, with their original headers
//! - HTML in an encoding that cannot be decoded is relayed as received

pub mod encoding;
pub mod interceptor;
pub mod rules;

use axum::http::{header, HeaderMap};

use crate::config::BackendConfig;
use rules::{Literal, RewriteRules};

pub use interceptor::Interceptor;

/// Where asset-origin URLs point after rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetTarget {
    /// `http://<Host>/static`, served by the static asset relay.
    LocalStatic,
    /// A configured alternate asset proxy, used verbatim.
    Proxy(String),
}

/// Rewrites origin URLs inside HTML bodies to point back at the proxy.
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    origin: Literal,
    asset_origin: Literal,
    asset_target: AssetTarget,
}

impl ContentRewriter {
    pub fn new(
        origin_base: &str,
        asset_origin_base: &str,
        asset_target: AssetTarget,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            origin: Literal::new(origin_base.trim_end_matches('/'))?,
            asset_origin: Literal::new(asset_origin_base.trim_end_matches('/'))?,
            asset_target,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, regex::Error> {
        let target = if config.static_mode {
            AssetTarget::LocalStatic
        } else {
            AssetTarget::Proxy(config.asset_proxy_url.clone())
        };
        Self::new(&config.target_url, &config.asset_origin_url, target)
    }

    /// Rule set for a response served under `host`.
    pub fn rules_for(&self, host: &str) -> RewriteRules<'_> {
        let asset_replacement = match &self.asset_target {
            AssetTarget::LocalStatic => format!("http://{}/static", host),
            AssetTarget::Proxy(url) => url.clone(),
        };
        RewriteRules::new(vec![
            (&self.origin, format!("http://{}", host)),
            (&self.asset_origin, asset_replacement),
        ])
    }

    pub fn rewrite(&self, body: &[u8], host: &str) -> Vec<u8> {
        self.rules_for(host).apply(body)
    }
}

/// True when the Content-Type header mentions `text/html`.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/html"))
        .unwrap_or(false)
}
