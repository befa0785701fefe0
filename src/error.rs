//! Request-path errors and their client-visible status codes.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure while serving one proxied request.
///
/// The client only ever sees the status code and a short fixed message.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid upstream url: {0}")]
    InvalidUpstream(String),

    #[error("failed to build upstream request: {0}")]
    RequestBuild(#[from] axum::http::Error),

    #[error("request body exceeds {0} bytes")]
    RequestTooLarge(usize),

    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("no backends configured")]
    NoBackends,

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("backend request failed: {0}")]
    Backend(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("failed to read upstream body: {0}")]
    UpstreamBody(#[source] reqwest::Error),

    #[error("log store unavailable: {0}")]
    Journal(#[from] std::io::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUpstream(_) | ProxyError::RequestBuild(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::RequestTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::NoBackends => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Upstream(_)
            | ProxyError::Backend(_)
            | ProxyError::Timeout(_)
            | ProxyError::UpstreamBody(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Journal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::InvalidUpstream(_) => "Invalid target URL",
            ProxyError::RequestBuild(_) => "Failed to create request",
            ProxyError::RequestTooLarge(_) => "Request body too large",
            ProxyError::RequestBody(_) => "Failed to read request body",
            ProxyError::NoBackends => "No backends available",
            ProxyError::Upstream(_) | ProxyError::Backend(_) => "Upstream request failed",
            ProxyError::Timeout(_) => "Upstream request timed out",
            ProxyError::UpstreamBody(_) => "Failed to read upstream response",
            ProxyError::Journal(_) => "Failed to read log file",
        }
    }
}

impl ProxyError {
    /// Classify a failure from `axum::body::to_bytes(body, limit)`.
    pub fn from_request_body(err: axum::Error, limit: usize) -> Self {
        let too_large = std::error::Error::source(&err)
            .is_some_and(|source| source.is::<http_body_util::LengthLimitError>());
        if too_large {
            ProxyError::RequestTooLarge(limit)
        } else {
            ProxyError::RequestBody(err)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::InvalidUpstream("::".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ProxyError::Timeout(Duration::from_secs(1)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ProxyError::NoBackends.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ProxyError::Journal(std::io::ErrorKind::NotFound.into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_hides_details() {
        let response = ProxyError::InvalidUpstream("10.0.0.7:3666 secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_payload_too_large() {
        let body = axum::body::Body::from("0123456789");
        let err = axum::body::to_bytes(body, 4).await.unwrap_err();

        let err = ProxyError::from_request_body(err, 4);
        assert!(matches!(err, ProxyError::RequestTooLarge(4)));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_aborted_body_is_bad_request() {
        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![
            Ok("partial"),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let body = axum::body::Body::from_stream(futures_util::stream::iter(chunks));
        let err = axum::body::to_bytes(body, 1024).await.unwrap_err();

        let err = ProxyError::from_request_body(err, 1024);
        assert!(matches!(err, ProxyError::RequestBody(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
