//! Pricing estimator: from aggregated payoff moments to a price.
//!
//! Given the sum and sum of squares of M raw payoffs:
//!
//! ```text
//! mean      = Σx / M
//! price     = exp(−r·T) · mean
//! variance  = (Σx² / M − mean²) · M / (M − 1)
//! std_error = exp(−r·T) · √(variance / M)
//! bounds    = price ± z · std_error
//! ```

use crate::error::PricingError;
use crate::params::SimulationParameters;

/// Confidence level, stored as its two-sided normal z-score.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceLevel {
    z: f64,
}

impl ConfidenceLevel {
    /// 90% two-sided.
    pub const P90: ConfidenceLevel = ConfidenceLevel { z: 1.644854 };
    /// 95% two-sided.
    pub const P95: ConfidenceLevel = ConfidenceLevel { z: 1.959964 };
    /// 99% two-sided.
    pub const P99: ConfidenceLevel = ConfidenceLevel { z: 2.575829 };

    /// Creates a level from an explicit z-score.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` unless `z` is positive and finite.
    pub fn from_z(z: f64) -> Result<Self, PricingError> {
        if !z.is_finite() || z <= 0.0 {
            return Err(PricingError::invalid(
                "z_score",
                format!("must be positive and finite, got {}", z),
            ));
        }
        Ok(Self { z })
    }

    /// Returns the z-score.
    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::P95
    }
}

/// Result of a pricing run.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::estimator::PricingResult;
///
/// let result = PricingResult {
///     price: 10.0,
///     std_error: 0.1,
///     lower_bound: 9.804,
///     upper_bound: 10.196,
///     n_paths: 10_000,
/// };
/// assert!((result.half_width() - 0.196).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Discounted price estimate.
    pub price: f64,
    /// Standard error of the discounted estimate.
    pub std_error: f64,
    /// Lower confidence bound.
    pub lower_bound: f64,
    /// Upper confidence bound.
    pub upper_bound: f64,
    /// Number of paths the estimate is based on.
    pub n_paths: usize,
}

impl PricingResult {
    /// Half-width of the confidence interval.
    #[inline]
    pub fn half_width(&self) -> f64 {
        0.5 * (self.upper_bound - self.lower_bound)
    }
}

/// Finalises with the default 95% confidence level.
///
/// # Errors
///
/// Returns `InsufficientSamples` when `n_paths < 2`.
pub fn finalize(
    sum: f64,
    sum_sq: f64,
    n_paths: usize,
    params: &SimulationParameters,
) -> Result<PricingResult, PricingError> {
    finalize_with(sum, sum_sq, n_paths, params, ConfidenceLevel::default())
}

/// Converts aggregated raw payoff moments into a [`PricingResult`].
///
/// Discounting by `exp(−r·T)` is applied here, once, to the mean and to the
/// standard error. A slightly negative variance from round-off (e.g. with
/// zero volatility) is clamped to zero.
///
/// # Errors
///
/// Returns `InsufficientSamples` when `n_paths < 2`.
pub fn finalize_with(
    sum: f64,
    sum_sq: f64,
    n_paths: usize,
    params: &SimulationParameters,
    confidence: ConfidenceLevel,
) -> Result<PricingResult, PricingError> {
    if n_paths < 2 {
        return Err(PricingError::InsufficientSamples { paths: n_paths });
    }

    let m = n_paths as f64;
    let discount = params.discount_factor();

    let raw_mean = sum / m;
    let variance = ((sum_sq / m - raw_mean * raw_mean) * m / (m - 1.0)).max(0.0);

    let price = discount * raw_mean;
    let std_error = discount * (variance / m).sqrt();
    let half_width = confidence.z() * std_error;

    Ok(PricingResult {
        price,
        std_error,
        lower_bound: price - half_width,
        upper_bound: price + half_width,
        n_paths,
    })
}
