//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{ProxyConfig, Role};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    UnknownRole(String),
    InvalidValue { key: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::UnknownRole(role) => write!(
                f,
                "Unknown role: {:?}. Use 'host' or 'backend' for the ROLE environment variable.",
                role
            ),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    load_config_with_role(path, None)
}

/// Like [`load_config`], with a role that takes precedence over file and environment.
pub fn load_config_with_role(
    path: Option<&Path>,
    role: Option<Role>,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    if role.is_some() {
        config.role = role;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment-style overrides through `lookup`.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(role) = get("ROLE") {
        config.role = Some(parse_role(&role)?);
    }

    if let Some(port) = get("PORT") {
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT",
            value: port.clone(),
        })?;
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    if let Some(target) = get("TARGET_URL") {
        config.backend.target_url = target;
    }

    if let Some(hosts) = get("BACKEND_HOSTS") {
        config.host.backends = hosts
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(flag) = get("STATIC_MODE") {
        config.backend.static_mode = flag == "true";
    }

    if let Some(url) = get("IMAGE_PROXY_URL") {
        config.backend.asset_proxy_url = url;
    }

    if let Some(url) = get("ASSET_ORIGIN_URL") {
        config.backend.asset_origin_url = url;
    }

    if let Some(path) = get("LOG_FILE") {
        config.journal.path = path;
    }

    if let Some(secs) = get("PROBE_INTERVAL_SECS") {
        config.host.probe.interval_secs = secs.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PROBE_INTERVAL_SECS",
            value: secs.clone(),
        })?;
    }

    Ok(())
}

/// Parse a role name, rejecting anything other than `host` or `backend`.
pub fn parse_role(value: &str) -> Result<Role, ConfigError> {
    value.parse().map_err(ConfigError::UnknownRole)
}
