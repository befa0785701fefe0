//! Backend pool management.
//!
//! # Responsibilities
//! - Own the weight table shared with the latency prober
//! - Apply the load balancing algorithm to one consistent snapshot
//! - Fall back to the first configured backend when the walk finds nothing

use std::sync::Arc;

use crate::load_balancer::{
    backend::BackendId,
    weighted::WeightedRandom,
    weights::WeightTable,
    LoadBalancer,
};

/// Selects backends for host-tier requests.
#[derive(Debug)]
pub struct BackendPool {
    table: Arc<WeightTable>,
    balancer: Box<dyn LoadBalancer>,
}

impl BackendPool {
    /// Create a pool over `table` using weighted random selection.
    pub fn new(table: Arc<WeightTable>) -> Self {
        Self::with_balancer(table, Box::new(WeightedRandom::new()))
    }

    pub fn with_balancer(table: Arc<WeightTable>, balancer: Box<dyn LoadBalancer>) -> Self {
        Self { table, balancer }
    }

    /// Build the pool and its table from configured `host:port` entries.
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Self {
        let ids = addresses.iter().map(BackendId::new).collect();
        Self::new(Arc::new(WeightTable::new(ids)))
    }

    /// Choose a backend. `None` only when the pool is empty.
    ///
    /// The table lock is held just long enough to copy it.
    pub fn select(&self) -> Option<BackendId> {
        let snapshot = self.table.snapshot();
        self.balancer
            .next_server(&snapshot)
            .or_else(|| self.table.pool().first().cloned())
    }

    /// The shared weight table.
    pub fn table(&self) -> &Arc<WeightTable> {
        &self.table
    }
}
