//! Lookback payoff evaluation.
//!
//! | Variant | Payoff |
//! |---|---|
//! | fixed-strike call | max(0, S_max − K) |
//! | fixed-strike put | max(0, K − S_min) |
//! | floating-strike call | S_T − S_min |
//! | floating-strike put | S_max − S_T |
//!
//! Payoffs are raw (undiscounted). Discounting happens once, on the
//! aggregated mean, in [`estimator::finalize`](crate::estimator::finalize).

use crate::params::{LookbackVariant, SimulationParameters};
use crate::path::PathExtrema;

/// Raw payoff of a completed path.
///
/// `params` supplies the variant and, for fixed-strike variants, the strike.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::params::{LookbackVariant, SimulationParameters};
/// use pricer_lookback::payoff::payoff;
///
/// let params = SimulationParameters::builder()
///     .spot(100.0)
///     .volatility(0.2)
///     .maturity(1.0)
///     .strike(100.0)
///     .variant(LookbackVariant::FixedCall)
///     .n_paths(1)
///     .n_steps(1)
///     .seed(0)
///     .build()
///     .unwrap();
///
/// assert_eq!(payoff(95.0, 120.0, 110.0, &params), 20.0);
/// ```
#[inline]
pub fn payoff(min_price: f64, max_price: f64, terminal_price: f64, params: &SimulationParameters) -> f64 {
    LookbackPayoff::from_params(params).evaluate(&PathExtrema {
        terminal: terminal_price,
        minimum: min_price,
        maximum: max_price,
    })
}

/// Lookback payoff with its strike resolved.
///
/// Cheap to copy; the engine builds one per run and shares it across workers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookbackPayoff {
    variant: LookbackVariant,
    /// Zero for floating-strike variants.
    strike: f64,
}

impl LookbackPayoff {
    /// Creates a payoff. `strike` is ignored by floating-strike variants.
    #[inline]
    pub fn new(variant: LookbackVariant, strike: f64) -> Self {
        Self { variant, strike }
    }

    /// Creates the payoff described by validated parameters.
    #[inline]
    pub fn from_params(params: &SimulationParameters) -> Self {
        Self::new(params.variant(), params.strike().unwrap_or(0.0))
    }

    /// Returns the variant.
    #[inline]
    pub fn variant(&self) -> LookbackVariant {
        self.variant
    }

    /// Evaluates the raw payoff of `path`.
    #[inline]
    pub fn evaluate(&self, path: &PathExtrema) -> f64 {
        match self.variant {
            LookbackVariant::FixedCall => (path.maximum - self.strike).max(0.0),
            LookbackVariant::FixedPut => (self.strike - path.minimum).max(0.0),
            LookbackVariant::FloatingCall => path.terminal - path.minimum,
            LookbackVariant::FloatingPut => path.maximum - path.terminal,
        }
    }
}
