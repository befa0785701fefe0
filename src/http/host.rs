//! Host tier request relay.
//!
//! Picks one backend per request from the weighted pool and relays the
//! request there unchanged. Responses stream back verbatim. A failed backend
//! call is answered with 502; it is never retried on another backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, Uri},
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;
use crate::http::client::HttpClient;
use crate::http::request::{client_host, RequestIdExt};
use crate::http::response::strip_hop_by_hop;
use crate::load_balancer::{BackendId, BackendPool};
use crate::observability::metrics;

/// State shared by host-tier handlers.
#[derive(Clone)]
pub struct HostState {
    pub pool: Arc<BackendPool>,
    pub client: HttpClient,
    /// Deadline for the backend's response head.
    pub timeout: Duration,
}

/// Load-balanced proxy handler.
pub async fn host_handler(State(state): State<HostState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.headers().request_id().to_string();

    let backend = match state.pool.select() {
        Some(backend) => backend,
        None => {
            tracing::warn!(request_id = %request_id, "No backends configured");
            let response = ProxyError::NoBackends.into_response();
            metrics::record_request("host", method.as_str(), response.status().as_u16(), start);
            return response;
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        backend = %backend,
        "Proxying request to backend"
    );

    let response = match forward(&state, &backend, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                backend = %backend,
                error = %e,
                "Backend request failed"
            );
            e.into_response()
        }
    };

    metrics::record_request("host", method.as_str(), response.status().as_u16(), start);
    response
}

/// Relay `request` to `backend` and hand back its response.
pub async fn forward(
    state: &HostState,
    backend: &BackendId,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri: Uri = format!("http://{}{}", backend, path_and_query)
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ProxyError::InvalidUpstream(e.to_string()))?;

    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (k, v) in parts.headers.iter() {
            headers.append(k.clone(), v.clone());
        }
        strip_hop_by_hop(headers);
        // HTTP/2 clients carry the host in the URI; the backend rewrites with it.
        if !headers.contains_key(header::HOST) {
            let host = client_host(&parts.headers, &parts.uri);
            if let Ok(value) = HeaderValue::from_str(&host) {
                if !host.is_empty() {
                    headers.insert(header::HOST, value);
                }
            }
        }
    }
    let outbound = builder.body(body)?;

    let response = tokio::time::timeout(state.timeout, state.client.request(outbound))
        .await
        .map_err(|_| ProxyError::Timeout(state.timeout))??;

    let (parts, body) = response.into_parts();
    Ok(Response::from_parts(parts, Body::new(body)))
}
