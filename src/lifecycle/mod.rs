//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config (already validated) → open log store → metrics → bind → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains, prober stops → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: an unopenable log store or unbindable port is fatal
//! - The prober and the server share one shutdown broadcast

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::{start, StartupError};
