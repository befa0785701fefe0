//! Shared weight table.
//!
//! # Responsibilities
//! - Hold one positive weight per configured backend
//! - Serialize reads and writes through a single mutex
//! - Hand out whole-table snapshots in configured pool order
//!
//! # Invariants
//! - Every pool member has exactly one entry after construction
//! - Weights are always >= 1; lower values are clamped on write
//! - Unknown identifiers are never inserted

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::load_balancer::backend::BackendId;

/// Lowest weight a backend can hold.
pub const MIN_WEIGHT: u32 = 1;

/// Translate a measured latency into a selection weight.
///
/// `floor(1s / latency)`, clamped to at least [`MIN_WEIGHT`]. A zero latency is
/// treated as one nanosecond.
pub fn weight_for_latency(latency: Duration) -> u32 {
    let nanos = latency.as_nanos().max(1);
    let weight = Duration::from_secs(1).as_nanos() / nanos;
    u32::try_from(weight).unwrap_or(u32::MAX).max(MIN_WEIGHT)
}

/// Backend identifier → weight, guarded by one mutex.
#[derive(Debug)]
pub struct WeightTable {
    pool: Vec<BackendId>,
    weights: Mutex<HashMap<BackendId, u32>>,
}

impl WeightTable {
    /// Create a table with every pool member at weight 1.
    pub fn new(pool: Vec<BackendId>) -> Self {
        let weights = pool.iter().map(|id| (id.clone(), MIN_WEIGHT)).collect();
        Self {
            pool,
            weights: Mutex::new(weights),
        }
    }

    /// The configured pool, in configuration order.
    pub fn pool(&self) -> &[BackendId] {
        &self.pool
    }

    /// Copy the whole table under one lock acquisition, in pool order.
    pub fn snapshot(&self) -> Vec<(BackendId, u32)> {
        let weights = self.lock();
        self.pool
            .iter()
            .map(|id| (id.clone(), weights.get(id).copied().unwrap_or(MIN_WEIGHT)))
            .collect()
    }

    /// Current weight of one backend.
    pub fn get(&self, id: &BackendId) -> Option<u32> {
        self.lock().get(id).copied()
    }

    /// Set one backend's weight. Returns false for identifiers outside the pool.
    pub fn set(&self, id: &BackendId, weight: u32) -> bool {
        match self.lock().get_mut(id) {
            Some(slot) => {
                *slot = weight.max(MIN_WEIGHT);
                true
            }
            None => false,
        }
    }

    /// Commit a full reweighting cycle under one lock acquisition.
    ///
    /// Readers observe either the previous cycle or this one, never a mix.
    pub fn apply(&self, updates: &[(BackendId, u32)]) {
        let mut weights = self.lock();
        for (id, weight) in updates {
            if let Some(slot) = weights.get_mut(id) {
                *slot = (*weight).max(MIN_WEIGHT);
            } else {
                tracing::warn!(backend = %id, "Ignoring weight for backend outside the pool");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BackendId, u32>> {
        // A panicking holder cannot leave a half-written entry: every write is a
        // single store, so the map is still consistent.
        self.weights.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
