//! Explicit, seedable randomness for every randomized step.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Source of uniform random numbers handed to randomized operations.
///
/// Implemented for every [`rand::Rng`], so a seeded `Pcg64Mcg` (or a
/// `&mut` to one) can be passed directly.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[lo, hi)`; returns `lo` for an empty range.
    fn next_range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.next_unit()
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        self.gen_range(0.0f32..1.0)
    }
}

/// Derives independent, reproducible RNG streams from one base seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedSequence {
    base: u64,
}

impl SeedSequence {
    pub fn new(seed: u64) -> Self {
        Self { base: seed }
    }

    /// RNG for a numbered phase of the pipeline.
    pub fn stream(&self, phase: u64) -> Pcg64Mcg {
        Pcg64Mcg::seed_from_u64(self.mix(phase))
    }

    /// Nested sequence, e.g. one per vegetation layer with one stream per row.
    pub fn child(&self, phase: u64) -> SeedSequence {
        SeedSequence { base: self.mix(phase) }
    }

    #[inline]
    fn mix(&self, phase: u64) -> u64 {
        self.base ^ phase.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}
