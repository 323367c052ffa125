//! Seeded synthesis of the Income Level and Financial Status columns.
//!
//! The assignment has to be reproducible across implementations, so the
//! random source is pinned down completely:
//!
//! - generator: MT19937 seeded with the reference `init_genrand(seed)`
//! - uniform: `genrand_res53`, i.e. `(a >> 5, b >> 6)` of two consecutive
//!   32-bit outputs combined into a 53-bit double in `[0, 1)`
//! - choice: cumulative weights normalised by their total; a draw `u` picks
//!   the first category whose cumulative weight is strictly greater than `u`
//! - order: one draw per row for Income Level, for every row, and only then
//!   one draw per row for Financial Status
//!
//! This is the same stream the legacy NumPy `RandomState` produces for
//! `seed(n)` followed by two `choice(..., p=...)` calls.

use crate::types::SampledCategory;
use rand::RngCore;
use rand_mt::Mt19937GenRand32;

/// Create the generator for a seed.
pub(crate) fn seeded_stream(seed: u32) -> Mt19937GenRand32 {
    Mt19937GenRand32::new(seed)
}

/// A uniform double in `[0, 1)` with 53 bits of precision.
pub(crate) fn next_uniform<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    let a = (rng.next_u32() >> 5) as f64;
    let b = (rng.next_u32() >> 6) as f64;
    (a * 67_108_864.0 + b) / 9_007_199_254_740_992.0
}

/// Weighted choice over a fixed set of categories.
pub(crate) struct WeightedChoice<T: SampledCategory> {
    cdf: [f64; 3],
    _category: std::marker::PhantomData<T>,
}

impl<T: SampledCategory> WeightedChoice<T> {
    pub(crate) fn new() -> Self {
        let mut cdf = [0.0; 3];
        let mut running = 0.0;
        for (slot, weight) in cdf.iter_mut().zip(T::WEIGHTS) {
            running += weight;
            *slot = running;
        }
        let total = cdf[cdf.len() - 1];
        for slot in cdf.iter_mut() {
            *slot /= total;
        }
        Self {
            cdf,
            _category: std::marker::PhantomData,
        }
    }

    /// Category selected by a uniform draw.
    pub(crate) fn pick(&self, u: f64) -> T {
        let idx = self.cdf.partition_point(|&edge| edge <= u);
        T::VARIANTS[idx.min(T::VARIANTS.len() - 1)]
    }

    /// Draw `n` categories from the stream.
    pub(crate) fn sample<R: RngCore + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<T> {
        (0..n).map(|_| self.pick(next_uniform(rng))).collect()
    }
}
