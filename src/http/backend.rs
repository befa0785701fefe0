//! Backend tier request relay.
//!
//! Every request goes to the single configured origin with the path and query
//! preserved and browser-like headers attached. The origin response passes
//! through the [`Interceptor`] before it reaches the client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::config::BackendConfig;
use crate::error::ProxyError;
use crate::http::assets;
use crate::http::request::{client_host, RequestIdExt};
use crate::http::response::strip_hop_by_hop;
use crate::observability::{metrics, Journal};
use crate::rewrite::Interceptor;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// State shared by backend-tier handlers.
#[derive(Clone)]
pub struct BackendState {
    pub config: Arc<BackendConfig>,
    pub target: Arc<Url>,
    pub asset_origin: Arc<Url>,
    pub client: reqwest::Client,
    pub interceptor: Interceptor,
    pub journal: Arc<Journal>,
    /// Headers that make the request look like it came from a desktop browser.
    pub browser_headers: Arc<HeaderMap>,
}

/// Build the browser-mimicking header set for `config`.
pub fn browser_headers(config: &BackendConfig) -> Result<HeaderMap, header::InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::REFERER, HeaderValue::from_str(&config.target_url)?);
    headers.insert(header::ORIGIN, HeaderValue::from_str(&config.target_url)?);
    Ok(headers)
}

/// Origin URL for an inbound request: target scheme and authority, inbound path and query.
pub fn upstream_url(target: &Url, uri: &Uri) -> Result<String, ProxyError> {
    let host = target
        .host_str()
        .ok_or_else(|| ProxyError::InvalidUpstream(target.to_string()))?;
    let authority = match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Ok(format!("{}://{}{}", target.scheme(), authority, path_and_query))
}

/// Proxy handler for everything except `/logs`.
pub async fn backend_handler(State(state): State<BackendState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.headers().request_id().to_string();

    tracing::info!(request_id = %request_id, method = %method, path = %path, "Received request");

    let result = if state.config.static_mode && assets::is_static_resource(&path) {
        tracing::info!(request_id = %request_id, path = %path, "Handling static resource");
        assets::relay(&state, request.uri()).await
    } else {
        forward(&state, request).await
    };

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Proxy request failed");
            e.into_response()
        }
    };

    tracing::info!(request_id = %request_id, status = %response.status(), "Response status");
    metrics::record_request("backend", method.as_str(), response.status().as_u16(), start);
    response
}

/// Forward to the origin and run the response through the interceptor.
pub async fn forward(state: &BackendState, request: Request<Body>) -> Result<Response, ProxyError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let (parts, body) = request.into_parts();

    let url = upstream_url(&state.target, &parts.uri)?;
    state
        .journal
        .record(&format!("Proxying request: {} {}", parts.method, parts.uri))
        .await;

    let limit = state.config.max_body_bytes;
    let body = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ProxyError::from_request_body(e, limit))?;

    let mut headers = parts.headers.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    for (name, value) in state.browser_headers.iter() {
        headers.insert(name.clone(), value.clone());
    }
    if let Some(ip) = peer {
        append_forwarded_for(&mut headers, &ip.to_string());
    }

    let upstream = state
        .client
        .request(parts.method.clone(), url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let host = client_host(&parts.headers, &parts.uri);
    state
        .interceptor
        .finish(upstream, &host, parts.method != Method::HEAD)
        .await
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: &str) {
    let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, ip),
        None => ip.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
