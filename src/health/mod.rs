//! Backend latency probing.
//!
//! # Data Flow
//! ```text
//! Periodic timer (first tick after one full interval)
//!     → prober.rs: GET /logs on each backend, timed until the body is drained
//!     → failure counts as a fixed large latency
//!     → weight = floor(1s / latency), at least 1
//!     → WeightTable::apply (one lock for the whole cycle)
//! ```
//!
//! # Design Decisions
//! - One loop owns the ticker, so cycles never overlap; late ticks are skipped
//! - Measurements happen outside the table lock
//! - Stopped through the shared shutdown broadcast
pub mod prober;

pub use prober::LatencyProber;
