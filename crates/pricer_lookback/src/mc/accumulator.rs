//! Running payoff moments.

/// Running sum, sum of squares, and count of raw payoffs.
///
/// Owned by one worker while it simulates; read once by the reduction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartialAccumulator {
    /// Σx
    pub sum: f64,
    /// Σx²
    pub sum_sq: f64,
    /// Number of samples.
    pub count: usize,
}

impl PartialAccumulator {
    /// Adds one sample.
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.sum_sq += value * value;
        self.count += 1;
    }

    /// Folds `other` into `self`.
    #[inline]
    pub fn merge(&mut self, other: &PartialAccumulator) {
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.count += other.count;
    }

    /// Returns true if both moments are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.sum.is_finite() && self.sum_sq.is_finite()
    }
}
