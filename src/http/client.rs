//! Outbound HTTP clients.
//!
//! - Backend client (hyper-util): host tier → backend tier, plain HTTP,
//!   streaming bodies in both directions. Also used by the latency prober.
//! - Origin client (reqwest): backend tier → origin and asset origin over
//!   HTTPS with certificate verification disabled, redirects not followed
//!   and response bodies left in their transfer encoding.

use std::time::Duration;

use axum::body::Body;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;

/// Client used to reach backend-tier instances.
pub type HttpClient = Client<HttpConnector, Body>;

pub fn backend_client(timeouts: &TimeoutConfig) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Client used to reach the origin. Upstream certificates are not verified.
///
/// Bodies are never decompressed here; only the HTML rewriter decodes.
pub fn origin_client(timeouts: &TimeoutConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::none())
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .no_proxy()
        .build()
}
