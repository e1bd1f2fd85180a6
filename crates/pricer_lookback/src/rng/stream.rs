//! Seeded sub-streams of standard normal variates.
//!
//! This module provides [`RandomSubStream`], an owned PRNG bound to one
//! `(seed, index)` pair, and [`create_streams`] for building an ordered set.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use crate::error::PricingError;

/// Golden-ratio increment of the SplitMix64 sequence.
const SPLITMIX_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Derives the seed of sub-stream `index` from the root `seed`.
///
/// Applies the SplitMix64 finaliser to `seed + (index + 1)·γ`. Distinct
/// indices map to distinct generator seeds, and neighbouring indices map to
/// statistically unrelated ones.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::rng::derive_seed;
///
/// assert_eq!(derive_seed(42, 7), derive_seed(42, 7));
/// assert_ne!(derive_seed(42, 7), derive_seed(42, 8));
/// ```
#[inline]
pub fn derive_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed.wrapping_add(index.wrapping_add(1).wrapping_mul(SPLITMIX_GAMMA));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// A non-overlapping segment of the pseudo-random sequence.
///
/// Owned exclusively by the computation unit that consumes it; its position
/// only advances through draws.
///
/// # Antithetic Mirror
///
/// [`RandomSubStream::antithetic`] returns a copy positioned at the same
/// draw that yields the negated variates, so a path and its mirror image can
/// be simulated from one stream.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::rng::RandomSubStream;
///
/// let mut stream = RandomSubStream::new(42, 3);
/// let mut mirror = stream.antithetic();
///
/// let z = stream.next_normal();
/// assert_eq!(mirror.next_normal(), -z);
/// ```
#[derive(Clone, Debug)]
pub struct RandomSubStream {
    /// The underlying PRNG instance.
    inner: StdRng,
    /// Root seed this stream was derived from.
    seed: u64,
    /// Stream index (the global path index in the pricing engine).
    index: u64,
    /// Whether draws are negated.
    negated: bool,
    /// Number of normal variates drawn so far.
    draws: u64,
}

impl RandomSubStream {
    /// Creates sub-stream `index` of the sequence rooted at `seed`.
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(derive_seed(seed, index)),
            seed,
            index,
            negated: false,
            draws: 0,
        }
    }

    /// Returns the root seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the stream index.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the number of normal variates drawn so far.
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Returns true if this stream yields negated variates.
    #[inline]
    pub fn is_antithetic(&self) -> bool {
        self.negated
    }

    /// Returns the mirror stream at the current position.
    #[inline]
    pub fn antithetic(&self) -> Self {
        Self {
            negated: !self.negated,
            ..self.clone()
        }
    }

    /// Draws one standard normal variate (Ziggurat via `rand_distr`).
    #[inline]
    pub fn next_normal(&mut self) -> f64 {
        self.draws += 1;
        let z: f64 = StandardNormal.sample(&mut self.inner);
        if self.negated {
            -z
        } else {
            z
        }
    }

    /// Draws one uniform variate in [0, 1).
    ///
    /// Not affected by the antithetic flag and not counted in [`draws`](Self::draws),
    /// so a path and its mirror see the same uniforms.
    #[inline]
    pub fn next_uniform(&mut self) -> f64 {
        self.inner.gen()
    }
}

/// Creates `count` ordered sub-streams rooted at `seed`.
///
/// Stream `i` of the result equals `RandomSubStream::new(seed, i)`.
///
/// # Errors
///
/// Returns `InvalidParameter` if `seed` is absent or `count` is zero.
pub fn create_streams(seed: Option<u64>, count: usize) -> Result<Vec<RandomSubStream>, PricingError> {
    let seed = seed.ok_or_else(|| PricingError::invalid("seed", "must be specified"))?;
    if count == 0 {
        return Err(PricingError::invalid("count", "must be at least 1"));
    }
    Ok((0..count as u64)
        .map(|index| RandomSubStream::new(seed, index))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_reproducibility() {
        let mut a = RandomSubStream::new(12345, 9);
        let mut b = RandomSubStream::new(12345, 9);
        for _ in 0..100 {
            assert_eq!(a.next_normal(), b.next_normal());
        }
        assert_eq!(a.draws(), 100);
    }

    #[test]
    fn test_distinct_indices_diverge() {
        let mut a = RandomSubStream::new(42, 0);
        let mut b = RandomSubStream::new(42, 1);
        let xs: Vec<f64> = (0..16).map(|_| a.next_normal()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.next_normal()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_distinct_seeds_diverge() {
        let mut a = RandomSubStream::new(1, 0);
        let mut b = RandomSubStream::new(2, 0);
        assert_ne!(a.next_normal(), b.next_normal());
    }

    #[test]
    fn test_derived_seeds_unique_over_range() {
        let mut seen = std::collections::HashSet::new();
        for index in 0..10_000 {
            assert!(seen.insert(derive_seed(42, index)));
        }
    }

    #[test]
    fn test_create_streams_matches_direct_construction() {
        let mut streams = create_streams(Some(99), 3).unwrap();
        assert_eq!(streams.len(), 3);
        for (i, stream) in streams.iter_mut().enumerate() {
            assert_eq!(stream.index(), i as u64);
            let mut direct = RandomSubStream::new(99, i as u64);
            assert_eq!(stream.next_normal(), direct.next_normal());
        }
    }

    #[test]
    fn test_create_streams_rejects_bad_input() {
        assert!(matches!(
            create_streams(None, 4),
            Err(PricingError::InvalidParameter { name: "seed", .. })
        ));
        assert!(matches!(
            create_streams(Some(1), 0),
            Err(PricingError::InvalidParameter { name: "count", .. })
        ));
    }

    #[test]
    fn test_antithetic_mirrors_draws() {
        let mut stream = RandomSubStream::new(5, 5);
        stream.next_normal();
        let mut mirror = stream.antithetic();
        assert!(mirror.is_antithetic());
        for _ in 0..20 {
            assert_eq!(mirror.next_normal(), -stream.next_normal());
        }
    }

    #[test]
    fn test_normal_moments() {
        let mut stream = RandomSubStream::new(2024, 0);
        let n = 100_000;
        let buffer: Vec<f64> = (0..n).map(|_| stream.next_normal()).collect();
        let mean = buffer.iter().sum::<f64>() / n as f64;
        let var = buffer.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!(mean.abs() < 0.02, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.02, "variance {}", var);
    }

    #[test]
    fn test_mirror_shares_uniforms() {
        let mut stream = RandomSubStream::new(3, 1);
        let mut mirror = stream.antithetic();
        for _ in 0..10 {
            assert_eq!(mirror.next_normal(), -stream.next_normal());
            assert_eq!(mirror.next_uniform(), stream.next_uniform());
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut stream = RandomSubStream::new(42, 0);
        for _ in 0..10_000 {
            let u = stream.next_uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
