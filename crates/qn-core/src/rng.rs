//! Deterministic simulation-level RNG.
//!
//! # Determinism strategy
//!
//! A simulation run owns exactly one `SimRng`.  Arrival processes, service
//! processes and the router all draw from it, in event order.  Because the
//! event loop is single-threaded and its order is total, a fixed seed fixes
//! the complete sequence of draws and therefore every recorded history.
//!
//! Independent replications (e.g. a parallel batch of runs) each build their
//! own scheduler from a seed drawn with [`SimRng::child_seed`] from one root
//! `SimRng`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation-level RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Draw a seed for replication `offset`.  The same root seed always
    /// yields the same sequence of child seeds.
    pub fn child_seed(&mut self, offset: u64) -> u64 {
        self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT)
    }

    /// Expose the inner `SmallRng` for use with `rand` / `rand_distr`
    /// distribution types (`rng.inner().sample(...)`).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
