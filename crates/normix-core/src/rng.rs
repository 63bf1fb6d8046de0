//! Random-number capability consumed by the samplers.
//!
//! Samplers never touch a concrete generator: they take any
//! [`RandomSource`], which every `rand::Rng` implements. Reproducible runs
//! use [`seeded_rng`], a ChaCha8 stream whose draws are fully determined by
//! the seed.

use rand::distr::{Distribution, StandardUniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Source of uniform and normal draws. Each call consumes exactly one
/// draw from the underlying stream.
pub trait RandomSource {
    /// Uniform draw on `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Normal draw with the given mean and standard deviation.
    fn normal(&mut self, mean: f64, sd: f64) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let u: f64 = StandardUniform.sample(self);
        low + (high - low) * u
    }

    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let z: f64 = StandardNormal.sample(self);
        mean + sd * z
    }
}

/// Deterministic generator for a fixed seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Fresh seed from the thread-local OS-seeded generator.
pub fn random_seed() -> u64 {
    rand::rng().random()
}
