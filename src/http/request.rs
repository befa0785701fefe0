//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4) and echo them on responses
//! - Extract the client-visible host used for URL rewriting
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An incoming `x-request-id` is kept, never replaced

use axum::http::{header, HeaderMap, Uri};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Access to the request ID assigned by the server's request-id layer.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// The host the client addressed: the `Host` header, else the URI authority.
pub fn client_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_host_prefers_header() {
        let mut headers = HeaderMap::new();
        let uri: Uri = "http://authority.example/x".parse().unwrap();
        assert_eq!(client_host(&headers, &uri), "authority.example");

        headers.insert(header::HOST, HeaderValue::from_static("proxy.local:3666"));
        assert_eq!(client_host(&headers, &uri), "proxy.local:3666");

        assert_eq!(client_host(&HeaderMap::new(), &"/x".parse().unwrap()), "");
    }

    #[test]
    fn test_request_id_fallback() {
        let mut headers = HeaderMap::new();
        assert_eq!(headers.request_id(), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(headers.request_id(), "abc-123");
    }
}
