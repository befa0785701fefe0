//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (ROLE, PORT, TARGET_URL, ... environment overrides)
//!     → validation.rs (semantic checks for the selected role)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend pool is fixed for the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    apply_env_overrides, load_config, load_config_with_role, parse_role, ConfigError,
};
pub use schema::{
    BackendConfig, HostConfig, JournalConfig, ListenerConfig, ObservabilityConfig, ProbeConfig,
    ProxyConfig, Role, TimeoutConfig,
};
