//! Static asset relay.
//!
//! With static mode on, `/static/...` and `/assets/...` requests bypass the
//! main origin and are fetched from the asset origin. Nothing is cached.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Uri},
    response::Response,
};
use url::Url;

use crate::error::ProxyError;
use crate::http::backend::BackendState;
use crate::http::response::{build_response, strip_hop_by_hop};

const STATIC_PREFIX: &str = "/static";
const ASSETS_PREFIX: &str = "/assets";

const ASSET_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Whether `path` belongs to the relay.
pub fn is_static_resource(path: &str) -> bool {
    path.starts_with(STATIC_PREFIX) || path.starts_with(ASSETS_PREFIX)
}

/// Asset origin URL for `uri`. Only the `/static` prefix is removed.
pub fn relay_url(asset_origin: &Url, uri: &Uri) -> Result<Url, ProxyError> {
    let path = uri.path();
    let path = path.strip_prefix(STATIC_PREFIX).unwrap_or(path);

    let mut url = asset_origin.clone();
    url.set_path(path);
    url.set_query(uri.query());
    if url.cannot_be_a_base() {
        return Err(ProxyError::InvalidUpstream(url.to_string()));
    }
    Ok(url)
}

fn asset_request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(ASSET_USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers
}

fn add_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
}

/// Fetch the asset and stream it back with the origin's status.
pub async fn relay(state: &BackendState, uri: &Uri) -> Result<Response, ProxyError> {
    let url = relay_url(&state.asset_origin, uri)?;
    state
        .journal
        .record(&format!("Proxying static resource: {} -> {}", uri.path(), url))
        .await;

    let upstream = state
        .client
        .get(url)
        .headers(asset_request_headers())
        .send()
        .await?;

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);
    add_cors(&mut headers);

    Ok(build_response(
        status,
        headers,
        Body::from_stream(upstream.bytes_stream()),
    ))
}
