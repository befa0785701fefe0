//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events to stdout)
//!     → metrics.rs (counters, gauges, histograms)
//!     → journal.rs (append-only text log served at GET /logs)
//!
//! Consumers:
//!     → Operator terminal / log aggregation
//!     → Metrics endpoint (Prometheus scrape, optional)
//!     → Host-tier latency prober and humans reading /logs
//! ```

pub mod journal;
pub mod logging;
pub mod metrics;

pub use journal::Journal;
