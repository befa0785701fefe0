//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the settings the selected role depends on
//! - Validate value ranges (intervals and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use url::Url;

use crate::config::schema::{ProxyConfig, Role};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the configuration for the role it selects.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    match config.role {
        None => errors.push(ValidationError::new(
            "role",
            "must be set to 'host' or 'backend'",
        )),
        Some(Role::Host) => validate_host(config, &mut errors),
        Some(Role::Backend) => validate_backend(config, &mut errors),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_host(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let host = &config.host;

    if host.backends.is_empty() {
        errors.push(ValidationError::new("host.backends", "at least one backend is required"));
    }

    let mut seen = HashSet::new();
    for entry in &host.backends {
        match Authority::from_str(entry) {
            Ok(authority) if authority.port_u16().is_some() => {}
            _ => errors.push(ValidationError::new(
                "host.backends",
                format!("expected host:port, got {:?}", entry),
            )),
        }
        if !seen.insert(entry.as_str()) {
            errors.push(ValidationError::new(
                "host.backends",
                format!("duplicate backend {:?}", entry),
            ));
        }
    }

    if host.probe.interval_secs == 0 {
        errors.push(ValidationError::new("host.probe.interval_secs", "must be greater than 0"));
    }
    if host.probe.timeout_secs == 0 {
        errors.push(ValidationError::new("host.probe.timeout_secs", "must be greater than 0"));
    }
    if !host.probe.path.starts_with('/') {
        errors.push(ValidationError::new("host.probe.path", "must start with '/'"));
    }
}

fn validate_backend(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let backend = &config.backend;

    check_http_url("backend.target_url", &backend.target_url, errors);
    check_http_url("backend.asset_origin_url", &backend.asset_origin_url, errors);
    if !backend.static_mode {
        check_http_url("backend.asset_proxy_url", &backend.asset_proxy_url, errors);
    }
}

fn check_http_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported url {:?} (scheme {})", value, url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("{:?}: {}", value, e))),
    }
}
