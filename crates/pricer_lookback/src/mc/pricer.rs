//! Lookback pricing engine.
//!
//! [`LookbackPricer`] binds validated parameters to an engine configuration
//! and exposes pricing and finite-difference Greeks.

use tracing::debug;

use super::aggregator::ParallelAggregator;
use super::config::EngineConfig;
use crate::error::PricingError;
use crate::estimator::PricingResult;
use crate::greeks::{Greek, GreeksConfig, GreeksResult};
use crate::params::SimulationParameters;

/// Monte Carlo pricer for one lookback contract.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::greeks::{Greek, GreeksConfig};
/// use pricer_lookback::mc::{EngineConfig, LookbackPricer};
/// use pricer_lookback::params::{LookbackVariant, SimulationParameters, WorkerCount};
///
/// let params = SimulationParameters::builder()
///     .spot(100.0)
///     .volatility(0.2)
///     .rate(0.05)
///     .maturity(1.0)
///     .variant(LookbackVariant::FloatingCall)
///     .n_paths(5_000)
///     .n_steps(50)
///     .seed(42)
///     .workers(WorkerCount::Fixed(2))
///     .build()
///     .unwrap();
///
/// let pricer = LookbackPricer::new(params, EngineConfig::default());
/// let result = pricer
///     .price_with_greeks(&[Greek::Delta], &GreeksConfig::default())
///     .unwrap();
/// assert!(result.price > 0.0);
/// assert!(result.delta.unwrap() > 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct LookbackPricer {
    params: SimulationParameters,
    config: EngineConfig,
}

impl LookbackPricer {
    /// Creates a pricer.
    #[inline]
    pub fn new(params: SimulationParameters, config: EngineConfig) -> Self {
        Self { params, config }
    }

    /// Returns the simulation parameters.
    #[inline]
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Returns the engine configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Prices the contract.
    ///
    /// # Errors
    ///
    /// See [`ParallelAggregator::run_with`].
    pub fn price(&self) -> Result<PricingResult, PricingError> {
        self.price_params(&self.params)
    }

    /// Prices the contract with the spot replaced by `spot`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive spot, otherwise as
    /// [`price`](Self::price).
    pub fn price_at_spot(&self, spot: f64) -> Result<PricingResult, PricingError> {
        let bumped = self.params.modified(|p| p.spot = spot)?;
        self.price_params(&bumped)
    }

    /// Central-difference delta at `spot`.
    ///
    /// # Errors
    ///
    /// As [`price_at_spot`](Self::price_at_spot).
    pub fn delta_at_spot(&self, spot: f64, greeks: &GreeksConfig) -> Result<f64, PricingError> {
        greeks.validate()?;
        let h = greeks.spot_bump_relative * spot;
        let up = self.price_at_spot(spot + h)?.price;
        let down = self.price_at_spot(spot - h)?.price;
        Ok((up - down) / (2.0 * h))
    }

    /// Prices the contract with the requested Greeks.
    ///
    /// Every revaluation uses the same seed as the base price.
    ///
    /// # Errors
    ///
    /// Returns the first error from the base price or any revaluation.
    pub fn price_with_greeks(
        &self,
        greeks: &[Greek],
        config: &GreeksConfig,
    ) -> Result<GreeksResult, PricingError> {
        config.validate()?;
        let base = self.price()?;

        let mut result = GreeksResult {
            price: base.price,
            std_error: base.std_error,
            ..Default::default()
        };

        for &greek in greeks {
            let value = match greek {
                Greek::Delta => self.compute_delta(config)?,
                Greek::Gamma => self.compute_gamma(base.price, config)?,
                Greek::Vega => self.compute_vega(base.price, config)?,
                Greek::Theta => self.compute_theta(base.price, config)?,
                Greek::Rho => self.compute_rho(config)?,
            };
            debug!(?greek, value, "greek computed");
            result.set(greek, value);
        }

        Ok(result)
    }

    fn price_params(&self, params: &SimulationParameters) -> Result<PricingResult, PricingError> {
        ParallelAggregator::new(self.config).run(params, params.workers().resolve())
    }

    fn revalue(
        &self,
        change: impl FnOnce(&mut SimulationParameters),
    ) -> Result<f64, PricingError> {
        let bumped = self.params.modified(change)?;
        Ok(self.price_params(&bumped)?.price)
    }

    fn compute_delta(&self, config: &GreeksConfig) -> Result<f64, PricingError> {
        self.delta_at_spot(self.params.spot(), config)
    }

    fn compute_gamma(&self, base: f64, config: &GreeksConfig) -> Result<f64, PricingError> {
        let spot = self.params.spot();
        let h = config.spot_bump_relative * spot;
        let up = self.revalue(|p| p.spot = spot + h)?;
        let down = self.revalue(|p| p.spot = spot - h)?;
        Ok((up - 2.0 * base + down) / (h * h))
    }

    /// Central in σ, forward when σ is below the bump.
    fn compute_vega(&self, base: f64, config: &GreeksConfig) -> Result<f64, PricingError> {
        let sigma = self.params.volatility();
        let h = config.vol_bump;
        let up = self.revalue(|p| p.volatility = sigma + h)?;
        if sigma >= h {
            let down = self.revalue(|p| p.volatility = sigma - h)?;
            Ok((up - down) / (2.0 * h))
        } else {
            Ok((up - base) / h)
        }
    }

    /// −∂V/∂T; central when T exceeds the bump, forward otherwise.
    fn compute_theta(&self, base: f64, config: &GreeksConfig) -> Result<f64, PricingError> {
        let maturity = self.params.maturity();
        let h = config.time_bump;
        let longer = self.revalue(|p| p.maturity = maturity + h)?;
        if maturity > h {
            let shorter = self.revalue(|p| p.maturity = maturity - h)?;
            Ok(-(longer - shorter) / (2.0 * h))
        } else {
            Ok(-(longer - base) / h)
        }
    }

    fn compute_rho(&self, config: &GreeksConfig) -> Result<f64, PricingError> {
        let rate = self.params.rate();
        let h = config.rate_bump;
        let up = self.revalue(|p| p.rate = rate + h)?;
        let down = self.revalue(|p| p.rate = rate - h)?;
        Ok((up - down) / (2.0 * h))
    }
}
