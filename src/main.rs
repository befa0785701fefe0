//! tandem-proxy
//!
//! ```text
//!                      ┌──────────────── host tier ────────────────┐
//!   Client ──────────▶ │ host.rs ──▶ BackendPool ──▶ WeightTable ◀─┼── LatencyProber
//!                      └──────┬────────────────────────────────────┘     (GET /logs)
//!                             │ weighted random pick
//!                             ▼
//!                      ┌────────────── backend tier ───────────────┐
//!                      │ backend.rs ──▶ origin ──▶ Interceptor     │
//!                      │ assets.rs  ──▶ asset origin (static mode) │
//!                      │ logs.rs    ──▶ Journal                    │
//!                      └───────────────────────────────────────────┘
//! ```
//!
//! The role comes from `--role`, the `ROLE` environment variable, or the
//! config file, in that order.

use std::path::PathBuf;

use clap::Parser;

use tandem_proxy::config::{load_config_with_role, Role};
use tandem_proxy::lifecycle::start;
use tandem_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "tandem-proxy")]
#[command(about = "Latency-weighted load balancer and content-rewriting reverse proxy", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tier to run: host or backend.
    #[arg(short, long)]
    role: Option<Role>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config_with_role(cli.config.as_deref(), cli.role) {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tandem-proxy starting");

    start(config).await?;
    Ok(())
}
