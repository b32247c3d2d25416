//! Random event counts for the dispatch loops.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};

/// Supplies how many events (arrivals, couriers) happen in one scheduler tick.
pub trait EventCountGenerator: Send + Sync {
    /// A non-negative count whose long-run average is `mean`.
    fn events_count(&self, mean: f64) -> u32;
}

/// Poisson-distributed event counts.
#[derive(Debug)]
pub struct PoissonGenerator {
    rng: Mutex<StdRng>,
}

impl PoissonGenerator {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Deterministic sequence, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl Default for PoissonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCountGenerator for PoissonGenerator {
    fn events_count(&self, mean: f64) -> u32 {
        if !mean.is_finite() {
            return 0;
        }
        let Ok(poisson) = Poisson::new(mean) else {
            return 0;
        };
        let sample: f64 = poisson.sample(&mut *self.rng.lock());
        sample.min(f64::from(u32::MAX)) as u32
    }
}
