//! Origin response interception.
//!
//! Turns an origin response into the client response: journals 403 bodies,
//! rewrites HTML, fixes `Content-Length`, and streams everything else with
//! its wire bytes and headers intact.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

use crate::error::ProxyError;
use crate::http::response::{build_response, strip_hop_by_hop};
use crate::observability::{metrics, Journal};
use crate::rewrite::encoding::{content_encoding, decode_body};
use crate::rewrite::{is_html, ContentRewriter};

/// Response post-processor for the backend tier.
#[derive(Debug, Clone)]
pub struct Interceptor {
    rewriter: Arc<ContentRewriter>,
    journal: Arc<Journal>,
}

impl Interceptor {
    pub fn new(rewriter: Arc<ContentRewriter>, journal: Arc<Journal>) -> Self {
        Self { rewriter, journal }
    }

    pub fn rewriter(&self) -> &ContentRewriter {
        &self.rewriter
    }

    /// Convert `upstream` into the client response.
    ///
    /// `host` is the client-visible Host header; `has_body` is false for HEAD.
    pub async fn finish(
        &self,
        upstream: reqwest::Response,
        host: &str,
        has_body: bool,
    ) -> Result<Response, ProxyError> {
        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let forbidden = status == StatusCode::FORBIDDEN;
        let html = has_body && is_html(&headers);

        if !forbidden && !html {
            let body = Body::from_stream(upstream.bytes_stream());
            return Ok(build_response(status, headers, body));
        }

        let body = upstream.bytes().await.map_err(ProxyError::UpstreamBody)?;
        let encoding = content_encoding(&headers);
        let decoded = match decode_body(&body, encoding.as_deref()) {
            Ok(decoded) => Some(Bytes::from(decoded)),
            Err(e) => {
                tracing::warn!(
                    encoding = ?encoding,
                    error = %e,
                    "Failed to decode origin body, relaying as received"
                );
                None
            }
        };

        if forbidden {
            metrics::record_forbidden_capture();
            let text = decoded.as_ref().unwrap_or(&body);
            self.journal
                .record(&format!("Received 403 response: {}", String::from_utf8_lossy(text)))
                .await;
        }

        let body = match decoded {
            Some(decoded) if html => self.rewrite_html(&mut headers, &decoded, host),
            _ => body,
        };

        Ok(build_response(status, headers, Body::from(body)))
    }

    fn rewrite_html(&self, headers: &mut HeaderMap, body: &Bytes, host: &str) -> Bytes {
        let rewritten = self.rewriter.rewrite(body, host);
        headers.remove(header::CONTENT_ENCODING);
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
        tracing::debug!(
            host = %host,
            original_len = body.len(),
            rewritten_len = rewritten.len(),
            "Rewrote HTML response"
        );
        Bytes::from(rewritten)
    }
}
