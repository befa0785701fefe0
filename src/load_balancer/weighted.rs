//! Weighted random load balancing strategy.

use rand::Rng;

use crate::load_balancer::{backend::BackendId, LoadBalancer};

/// Picks a backend with probability proportional to its weight.
#[derive(Debug, Default)]
pub struct WeightedRandom;

impl WeightedRandom {
    pub fn new() -> Self {
        Self
    }

    /// Select using a caller-provided random source.
    pub fn next_server_with<R: Rng + ?Sized>(
        &self,
        candidates: &[(BackendId, u32)],
        rng: &mut R,
    ) -> Option<BackendId> {
        let first = candidates.first()?;
        let total: u64 = candidates.iter().map(|(_, w)| u64::from(*w)).sum();
        if total == 0 {
            return Some(first.0.clone());
        }
        let draw = rng.gen_range(0..total);
        Some(pick(candidates, draw).unwrap_or(&first.0).clone())
    }
}

impl LoadBalancer for WeightedRandom {
    fn next_server(&self, candidates: &[(BackendId, u32)]) -> Option<BackendId> {
        self.next_server_with(candidates, &mut rand::thread_rng())
    }
}

/// Walk the candidates, subtracting weights from `draw` until it falls inside one.
///
/// Returns `None` when `draw` is not below the total weight.
pub fn pick(candidates: &[(BackendId, u32)], mut draw: u64) -> Option<&BackendId> {
    for (id, weight) in candidates {
        let weight = u64::from(*weight);
        if draw < weight {
            return Some(id);
        }
        draw -= weight;
    }
    None
}
