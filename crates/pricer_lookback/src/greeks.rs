//! Sensitivity types for finite-difference Greeks.
//!
//! Greeks are computed by bump-and-revalue in
//! [`LookbackPricer::price_with_greeks`](crate::mc::LookbackPricer::price_with_greeks).
//! Every revaluation reuses the run's seed, so the bumped and base prices
//! share their random numbers and the difference quotient is not swamped by
//! Monte Carlo noise.

use crate::error::PricingError;

/// Greek type for selection.
///
/// # First-Order Greeks
///
/// - `Delta`: ∂V/∂S
/// - `Vega`: ∂V/∂σ
/// - `Theta`: −∂V/∂T (time decay)
/// - `Rho`: ∂V/∂r
///
/// # Second-Order Greeks
///
/// - `Gamma`: ∂²V/∂S²
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Greek {
    /// Delta: ∂V/∂S (sensitivity to spot price)
    Delta,
    /// Gamma: ∂²V/∂S² (convexity with respect to spot)
    Gamma,
    /// Vega: ∂V/∂σ (sensitivity to volatility)
    Vega,
    /// Theta: −∂V/∂T (sensitivity to the passage of time)
    Theta,
    /// Rho: ∂V/∂r (sensitivity to interest rate)
    Rho,
}

impl Greek {
    /// Every supported Greek.
    pub const ALL: [Greek; 5] = [
        Greek::Delta,
        Greek::Gamma,
        Greek::Vega,
        Greek::Theta,
        Greek::Rho,
    ];
}

/// Bump sizes for finite differences.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::greeks::GreeksConfig;
///
/// let config = GreeksConfig::default();
/// assert_eq!(config.spot_bump_relative, 0.01);
/// assert!((config.time_bump - 1.0 / 252.0).abs() < 1e-15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreeksConfig {
    /// Spot bump as a fraction of spot.
    pub spot_bump_relative: f64,
    /// Absolute volatility bump.
    pub vol_bump: f64,
    /// Absolute rate bump.
    pub rate_bump: f64,
    /// Maturity bump in years.
    pub time_bump: f64,
}

impl Default for GreeksConfig {
    fn default() -> Self {
        Self {
            spot_bump_relative: 0.01,
            vol_bump: 0.01,
            rate_bump: 0.01,
            time_bump: 1.0 / 252.0,
        }
    }
}

impl GreeksConfig {
    /// Checks that every bump is positive and finite and that the spot bump
    /// stays below 100%.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the offending bump.
    pub fn validate(&self) -> Result<(), PricingError> {
        let checks = [
            ("spot_bump_relative", self.spot_bump_relative),
            ("vol_bump", self.vol_bump),
            ("rate_bump", self.rate_bump),
            ("time_bump", self.time_bump),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(PricingError::invalid(
                    name,
                    format!("must be positive and finite, got {}", value),
                ));
            }
        }
        if self.spot_bump_relative >= 1.0 {
            return Err(PricingError::invalid(
                "spot_bump_relative",
                format!("must be below 1, got {}", self.spot_bump_relative),
            ));
        }
        Ok(())
    }
}

/// Price with the requested sensitivities.
///
/// Greeks that were not requested are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreeksResult {
    /// Present value.
    pub price: f64,
    /// Standard error of the price.
    pub std_error: f64,
    /// Delta: ∂V/∂S.
    pub delta: Option<f64>,
    /// Gamma: ∂²V/∂S².
    pub gamma: Option<f64>,
    /// Vega: ∂V/∂σ, per unit of volatility.
    pub vega: Option<f64>,
    /// Theta: −∂V/∂T, per year.
    pub theta: Option<f64>,
    /// Rho: ∂V/∂r, per unit of rate.
    pub rho: Option<f64>,
}

impl GreeksResult {
    /// Returns the value of `greek`, if computed.
    #[inline]
    pub fn get(&self, greek: Greek) -> Option<f64> {
        match greek {
            Greek::Delta => self.delta,
            Greek::Gamma => self.gamma,
            Greek::Vega => self.vega,
            Greek::Theta => self.theta,
            Greek::Rho => self.rho,
        }
    }

    /// Stores `value` as `greek`.
    #[inline]
    pub fn set(&mut self, greek: Greek, value: f64) {
        let slot = match greek {
            Greek::Delta => &mut self.delta,
            Greek::Gamma => &mut self.gamma,
            Greek::Vega => &mut self.vega,
            Greek::Theta => &mut self.theta,
            Greek::Rho => &mut self.rho,
        };
        *slot = Some(value);
    }
}
