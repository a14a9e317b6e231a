//! Random draws behind a trait so controllers stay deterministic in tests.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of bounded uniform draws used for idle-clip selection and
/// loop-continuation rolls.
pub trait RandomSource {
    /// Uniform integer in `0..bound`. Returns 0 when `bound <= 1`.
    fn below(&mut self, bound: i64) -> i64;
}

/// Default source backed by a small fast PRNG.
pub struct SmallRngSource {
    rng: SmallRng,
}

impl SmallRngSource {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Fixed-seed constructor for reproducible simulator runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for SmallRngSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SmallRngSource {
    fn below(&mut self, bound: i64) -> i64 {
        if bound <= 1 {
            return 0;
        }
        self.rng.random_range(0..bound)
    }
}
