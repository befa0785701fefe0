//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which tier this process runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Load-balances client traffic across the backend pool.
    Host,
    /// Reverse-proxies a single upstream origin and rewrites HTML.
    Backend,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(Role::Host),
            "backend" => Ok(Role::Backend),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => f.write_str("host"),
            Role::Backend => f.write_str("backend"),
        }
    }
}

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Tier to run. Must be set by file, environment or CLI.
    pub role: Option<Role>,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Host tier settings.
    pub host: HostConfig,

    /// Backend tier settings.
    pub backend: BackendConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Append-only log store.
    pub journal: JournalConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3666").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3666".to_string(),
        }
    }
}

/// Host tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Backend pool as `host:port` entries, in selection order.
    pub backends: Vec<String>,

    /// Latency probing settings.
    pub probe: ProbeConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            backends: vec![
                "192.168.1.10:3666".to_string(),
                "192.168.1.11:3666".to_string(),
                "192.168.1.12:3666".to_string(),
            ],
            probe: ProbeConfig::default(),
        }
    }
}

/// Latency probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Seconds between probe cycles. The first cycle runs after one interval.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path requested on each backend.
    pub path: String,

    /// Latency assigned to a backend whose probe failed, in seconds.
    pub failure_latency_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30 * 60,
            timeout_secs: 10,
            path: "/logs".to_string(),
            failure_latency_secs: 60 * 60,
        }
    }
}

/// Backend tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Upstream origin every request is forwarded to.
    pub target_url: String,

    /// Secondary asset origin (images, CSS, JS).
    pub asset_origin_url: String,

    /// Route `/static` and `/assets` through the local relay.
    pub static_mode: bool,

    /// Replacement for the asset origin when static mode is off.
    pub asset_proxy_url: String,

    /// User-Agent presented to the origin.
    pub user_agent: String,

    /// Maximum inbound request body forwarded to the origin.
    pub max_body_bytes: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            target_url: "https://www.themoviedb.org".to_string(),
            asset_origin_url: "https://image.tmdb.org".to_string(),
            static_mode: false,
            asset_proxy_url: "https://image.tmdb.org".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/85.0.4183.121 Safari/537.36"
                .to_string(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Append-only log store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Path of the plain-text log file.
    pub path: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: "proxy_service.log".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
