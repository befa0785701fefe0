//! `GET /logs`: the raw log store as plain text.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;
use crate::http::backend::BackendState;

pub async fn logs_handler(State(state): State<BackendState>) -> Response {
    match state.journal.read_all().await {
        Ok(content) => ([(header::CONTENT_TYPE, "text/plain")], content).into_response(),
        Err(e) => {
            tracing::error!(path = %state.journal.path().display(), error = %e, "Failed to read log store");
            ProxyError::Journal(e).into_response()
        }
    }
}
