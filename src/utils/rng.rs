// src/utils/rng.rs
// Seeded random source owned by a single generation run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic random source: the same seed plus the same sequence of
/// calls always reproduces the same outputs. One instance must never be
/// shared between concurrently executing generation runs.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_seed(seed: u32) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform boolean draw.
    pub fn coin_flip(&mut self) -> bool {
        self.rng.random::<bool>()
    }

    /// Draws candidates until `accept` holds, spending at most
    /// `max_attempts` draws. Returns the last candidate together with
    /// whether it was accepted; on exhaustion the candidate is kept as a
    /// best-effort result rather than failing.
    pub fn sample_until<T>(
        &mut self,
        max_attempts: usize,
        mut draw: impl FnMut(&mut Self) -> T,
        accept: impl Fn(&T) -> bool,
    ) -> (T, bool) {
        let mut candidate = draw(self);
        let mut accepted = accept(&candidate);
        let mut attempts = 1;
        while !accepted && attempts < max_attempts {
            candidate = draw(self);
            accepted = accept(&candidate);
            attempts += 1;
        }
        (candidate, accepted)
    }
}
