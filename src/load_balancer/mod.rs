//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Host-tier request
//!     → pool.rs (snapshot the weight table under one lock)
//!     → weighted.rs (weighted random draw over the snapshot)
//!     → Return backend identifier, or the first configured backend
//!
//! Latency prober (health/prober.rs)
//!     → weights.rs (commit a whole cycle of new weights)
//! ```
//!
//! # Design Decisions
//! - The weight table is an owned object injected into prober and pool
//! - Selection walks the configured pool order, never map order
//! - Every backend keeps weight >= 1 so a recovered backend gets traffic again

pub mod backend;
pub mod pool;
pub mod weighted;
pub mod weights;

pub use backend::BackendId;
pub use pool::BackendPool;
pub use weights::WeightTable;

/// Strategy for choosing one backend from a weighted snapshot.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Pick a backend from `candidates`, given in configured pool order.
    fn next_server(&self, candidates: &[(BackendId, u32)]) -> Option<BackendId>;
}
