//! Price and delta profiles over a grid of spot prices.
//!
//! The grid is `s_k = k · dx · S0` for `k = 1, 2, …` while `s_k < 2·S0`,
//! i.e. the open interval (0, 2·S0) sampled with relative step `dx`.
//! Each point is priced with the run's seed, so the curves are smooth in
//! spot rather than carrying independent Monte Carlo noise per point.

use crate::error::PricingError;
use crate::greeks::GreeksConfig;
use crate::mc::LookbackPricer;

/// Upper bound on the number of points in a profile.
pub const MAX_PROFILE_POINTS: usize = 10_000;

/// Points `(x, y)` of a profile.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpotProfile {
    /// Spot prices.
    pub spots: Vec<f64>,
    /// Value at each spot.
    pub values: Vec<f64>,
}

impl SpotProfile {
    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// Returns true if the profile has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Iterates over `(spot, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.spots.iter().copied().zip(self.values.iter().copied())
    }
}

/// Spot grid for base spot `spot` and relative step `dx`.
///
/// # Errors
///
/// Returns `InvalidParameter` unless `0 < dx <= 1` and the grid has at most
/// [`MAX_PROFILE_POINTS`] points, i.e. `2 / dx <= MAX_PROFILE_POINTS`.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::profile::spot_grid;
///
/// let grid = spot_grid(100.0, 0.5).unwrap();
/// assert_eq!(grid, vec![50.0, 100.0, 150.0]);
/// ```
pub fn spot_grid(spot: f64, dx: f64) -> Result<Vec<f64>, PricingError> {
    if !dx.is_finite() || dx <= 0.0 || dx > 1.0 {
        return Err(PricingError::invalid(
            "dx",
            format!("must be in (0, 1], got {}", dx),
        ));
    }
    if 2.0 / dx > MAX_PROFILE_POINTS as f64 {
        return Err(PricingError::invalid(
            "dx",
            format!(
                "must be at least {} to keep the grid within {} points, got {}",
                2.0 / MAX_PROFILE_POINTS as f64,
                MAX_PROFILE_POINTS,
                dx
            ),
        ));
    }
    let upper = 2.0 * spot;
    Ok((1..)
        .map(|k| k as f64 * dx * spot)
        .take_while(|&s| s < upper)
        .collect())
}

/// Price as a function of spot.
///
/// # Errors
///
/// Returns the first error from the grid or any pricing run.
pub fn price_profile(pricer: &LookbackPricer, dx: f64) -> Result<SpotProfile, PricingError> {
    let spots = spot_grid(pricer.params().spot(), dx)?;
    let values = spots
        .iter()
        .map(|&s| pricer.price_at_spot(s).map(|r| r.price))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpotProfile { spots, values })
}

/// Delta as a function of spot.
///
/// # Errors
///
/// Returns the first error from the grid or any pricing run.
pub fn delta_profile(
    pricer: &LookbackPricer,
    dx: f64,
    greeks: &GreeksConfig,
) -> Result<SpotProfile, PricingError> {
    let spots = spot_grid(pricer.params().spot(), dx)?;
    let values = spots
        .iter()
        .map(|&s| pricer.delta_at_spot(s, greeks))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpotProfile { spots, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::EngineConfig;
    use crate::params::{LookbackVariant, SimulationParameters, WorkerCount};

    fn pricer() -> LookbackPricer {
        let params = SimulationParameters::builder()
            .spot(100.0)
            .volatility(0.2)
            .rate(0.03)
            .maturity(0.5)
            .strike(100.0)
            .variant(LookbackVariant::FixedCall)
            .n_paths(2_000)
            .n_steps(20)
            .seed(5)
            .workers(WorkerCount::Fixed(2))
            .build()
            .unwrap();
        LookbackPricer::new(params, EngineConfig::default())
    }

    #[test]
    fn test_grid_excludes_zero_and_upper_end() {
        let grid = spot_grid(100.0, 0.25).unwrap();
        assert_eq!(grid.len(), 7);
        assert_eq!(grid[0], 25.0);
        assert!(grid.iter().all(|&s| s > 0.0 && s < 200.0));
    }

    #[test]
    fn test_grid_rejects_bad_step() {
        assert!(spot_grid(100.0, 0.0).is_err());
        assert!(spot_grid(100.0, 1.5).is_err());
        assert!(spot_grid(100.0, f64::NAN).is_err());
    }

    #[test]
    fn test_grid_size_is_bounded() {
        assert!(matches!(
            spot_grid(100.0, 1e-9),
            Err(PricingError::InvalidParameter { name: "dx", .. })
        ));
        assert!(matches!(
            price_profile(&pricer(), 1e-6),
            Err(PricingError::InvalidParameter { name: "dx", .. })
        ));

        let fine = spot_grid(100.0, 5e-4).unwrap();
        assert!(fine.len() < MAX_PROFILE_POINTS);
        assert!(fine.len() >= 3_998);
    }

    #[test]
    fn test_fixed_call_price_increases_with_spot() {
        let profile = price_profile(&pricer(), 0.25).unwrap();
        assert_eq!(profile.len(), 7);
        let values: Vec<f64> = profile.points().map(|(_, v)| v).collect();
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_delta_profile_shape() {
        let profile = delta_profile(&pricer(), 0.5, &GreeksConfig::default()).unwrap();
        assert_eq!(profile.spots, vec![50.0, 100.0, 150.0]);
        assert!(profile.values.iter().all(|d| d.is_finite() && *d >= 0.0));
    }
}
