//! Simulation parameters for lookback pricing.
//!
//! [`SimulationParameters`] is immutable once built. Every invariant is
//! checked in [`SimulationParametersBuilder::build`], so a value of this type
//! is always safe to hand to the parallel engine.

use std::fmt;
use std::str::FromStr;

use crate::error::PricingError;

/// Lookback option variant.
///
/// A closed set of four cases: fixed or floating strike, call or put.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LookbackVariant {
    /// Fixed strike call: max(S_max - K, 0)
    FixedCall,
    /// Fixed strike put: max(K - S_min, 0)
    FixedPut,
    /// Floating strike call: S_T - S_min
    FloatingCall,
    /// Floating strike put: S_max - S_T
    FloatingPut,
}

impl LookbackVariant {
    /// All variants in code order.
    pub const ALL: [LookbackVariant; 4] = [
        LookbackVariant::FixedCall,
        LookbackVariant::FixedPut,
        LookbackVariant::FloatingCall,
        LookbackVariant::FloatingPut,
    ];

    /// Returns true if this uses a fixed strike.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self, LookbackVariant::FixedCall | LookbackVariant::FixedPut)
    }

    /// Stable integer code used at the host boundary.
    #[inline]
    pub fn code(&self) -> i32 {
        match self {
            LookbackVariant::FixedCall => 0,
            LookbackVariant::FixedPut => 1,
            LookbackVariant::FloatingCall => 2,
            LookbackVariant::FloatingPut => 3,
        }
    }
}

impl TryFrom<i32> for LookbackVariant {
    type Error = PricingError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(LookbackVariant::FixedCall),
            1 => Ok(LookbackVariant::FixedPut),
            2 => Ok(LookbackVariant::FloatingCall),
            3 => Ok(LookbackVariant::FloatingPut),
            other => Err(PricingError::invalid(
                "variant",
                format!("unknown variant code {}, expected 0..=3", other),
            )),
        }
    }
}

impl FromStr for LookbackVariant {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "fixed-call" => Ok(LookbackVariant::FixedCall),
            "fixed-put" => Ok(LookbackVariant::FixedPut),
            "floating-call" => Ok(LookbackVariant::FloatingCall),
            "floating-put" => Ok(LookbackVariant::FloatingPut),
            _ => Err(PricingError::invalid(
                "variant",
                format!(
                    "unknown variant '{}', expected fixed-call, fixed-put, floating-call or floating-put",
                    s
                ),
            )),
        }
    }
}

impl fmt::Display for LookbackVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookbackVariant::FixedCall => "fixed-call",
            LookbackVariant::FixedPut => "fixed-put",
            LookbackVariant::FloatingCall => "floating-call",
            LookbackVariant::FloatingPut => "floating-put",
        };
        f.write_str(name)
    }
}

/// Number of workers used by a pricing run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkerCount {
    /// One worker per logical CPU.
    #[default]
    Auto,
    /// Explicit override.
    Fixed(usize),
}

impl WorkerCount {
    /// Resolves to a concrete, non-zero worker count.
    #[inline]
    pub fn resolve(&self) -> usize {
        match self {
            WorkerCount::Auto => num_cpus::get().max(1),
            WorkerCount::Fixed(n) => (*n).max(1),
        }
    }
}

/// Validated inputs of one pricing run.
///
/// Use [`SimulationParameters::builder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::params::{LookbackVariant, SimulationParameters};
///
/// let params = SimulationParameters::builder()
///     .spot(100.0)
///     .volatility(0.2)
///     .rate(0.05)
///     .maturity(1.0)
///     .strike(100.0)
///     .variant(LookbackVariant::FixedCall)
///     .n_paths(10_000)
///     .n_steps(252)
///     .seed(42)
///     .build()
///     .expect("valid parameters");
///
/// assert_eq!(params.n_steps(), 252);
/// assert!((params.dt() - 1.0 / 252.0).abs() < 1e-15);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulationParameters {
    pub(crate) spot: f64,
    pub(crate) volatility: f64,
    pub(crate) rate: f64,
    pub(crate) dividend: f64,
    pub(crate) maturity: f64,
    pub(crate) strike: Option<f64>,
    pub(crate) variant: LookbackVariant,
    pub(crate) n_steps: usize,
    pub(crate) n_paths: usize,
    pub(crate) seed: u64,
    pub(crate) workers: WorkerCount,
}

impl SimulationParameters {
    /// Creates a new parameter builder.
    #[inline]
    pub fn builder() -> SimulationParametersBuilder {
        SimulationParametersBuilder::default()
    }

    /// Initial spot price S0.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Volatility σ.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Continuously compounded risk-free rate r.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Continuous dividend yield q.
    #[inline]
    pub fn dividend(&self) -> f64 {
        self.dividend
    }

    /// Maturity T in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Strike K. `None` for floating-strike variants.
    #[inline]
    pub fn strike(&self) -> Option<f64> {
        self.strike
    }

    /// Option variant.
    #[inline]
    pub fn variant(&self) -> LookbackVariant {
        self.variant
    }

    /// Time steps per path N.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of simulated paths M.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Root seed of the random streams.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Requested worker count.
    #[inline]
    pub fn workers(&self) -> WorkerCount {
        self.workers
    }

    /// Step size dt = T / N.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.maturity / self.n_steps as f64
    }

    /// Discount factor exp(-r·T).
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    /// Returns a copy with a different worker count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for `WorkerCount::Fixed(0)`.
    pub fn with_workers(&self, workers: WorkerCount) -> Result<Self, PricingError> {
        self.modified(|p| p.workers = workers)
    }

    /// Returns a copy with a different path count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a zero path count.
    pub fn with_paths(&self, n_paths: usize) -> Result<Self, PricingError> {
        self.modified(|p| p.n_paths = n_paths)
    }

    /// Clones, applies `change`, and re-validates the result.
    pub(crate) fn modified(
        &self,
        change: impl FnOnce(&mut SimulationParameters),
    ) -> Result<Self, PricingError> {
        let mut next = self.clone();
        change(&mut next);
        next.validate()?;
        Ok(next)
    }

    /// Checks every invariant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first violated field.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(PricingError::invalid(
                "spot",
                format!("must be positive and finite, got {}", self.spot),
            ));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(PricingError::invalid(
                "volatility",
                format!("must be non-negative and finite, got {}", self.volatility),
            ));
        }
        if !self.rate.is_finite() {
            return Err(PricingError::invalid(
                "rate",
                format!("must be finite, got {}", self.rate),
            ));
        }
        if !self.dividend.is_finite() {
            return Err(PricingError::invalid(
                "dividend",
                format!("must be finite, got {}", self.dividend),
            ));
        }
        if !self.maturity.is_finite() || self.maturity <= 0.0 {
            return Err(PricingError::invalid(
                "maturity",
                format!("must be positive and finite, got {}", self.maturity),
            ));
        }
        if self.n_steps == 0 {
            return Err(PricingError::invalid("n_steps", "must be at least 1"));
        }
        if self.n_paths == 0 {
            return Err(PricingError::invalid("n_paths", "must be at least 1"));
        }
        if self.variant.is_fixed() {
            match self.strike {
                None => {
                    return Err(PricingError::invalid(
                        "strike",
                        format!("required for {} variant", self.variant),
                    ))
                }
                Some(k) if !k.is_finite() || k <= 0.0 => {
                    return Err(PricingError::invalid(
                        "strike",
                        format!("must be positive and finite, got {}", k),
                    ))
                }
                Some(_) => {}
            }
        }
        if self.workers == WorkerCount::Fixed(0) {
            return Err(PricingError::invalid("workers", "must be at least 1"));
        }
        Ok(())
    }
}

/// Builder for [`SimulationParameters`].
///
/// Rate and dividend default to zero and the worker count to
/// [`WorkerCount::Auto`]. Every other field must be set.
#[derive(Clone, Debug, Default)]
pub struct SimulationParametersBuilder {
    spot: Option<f64>,
    volatility: Option<f64>,
    rate: f64,
    dividend: f64,
    maturity: Option<f64>,
    strike: Option<f64>,
    variant: Option<LookbackVariant>,
    n_steps: Option<usize>,
    n_paths: Option<usize>,
    seed: Option<u64>,
    workers: WorkerCount,
}

impl SimulationParametersBuilder {
    /// Sets the initial spot price.
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Sets the volatility.
    #[inline]
    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Sets the risk-free rate.
    #[inline]
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the dividend yield.
    #[inline]
    pub fn dividend(mut self, dividend: f64) -> Self {
        self.dividend = dividend;
        self
    }

    /// Sets the maturity in years.
    #[inline]
    pub fn maturity(mut self, maturity: f64) -> Self {
        self.maturity = Some(maturity);
        self
    }

    /// Sets the strike.
    #[inline]
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    /// Sets or clears the strike.
    #[inline]
    pub fn strike_opt(mut self, strike: Option<f64>) -> Self {
        self.strike = strike;
        self
    }

    /// Sets the option variant.
    #[inline]
    pub fn variant(mut self, variant: LookbackVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Sets the number of time steps per path.
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    /// Sets the number of paths.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the root seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets or clears the root seed.
    #[inline]
    pub fn seed_opt(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the worker count.
    #[inline]
    pub fn workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    /// Builds and validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a required field is missing or any
    /// invariant is violated.
    pub fn build(self) -> Result<SimulationParameters, PricingError> {
        let spot = self
            .spot
            .ok_or_else(|| PricingError::invalid("spot", "must be specified"))?;
        let volatility = self
            .volatility
            .ok_or_else(|| PricingError::invalid("volatility", "must be specified"))?;
        let maturity = self
            .maturity
            .ok_or_else(|| PricingError::invalid("maturity", "must be specified"))?;
        let variant = self
            .variant
            .ok_or_else(|| PricingError::invalid("variant", "must be specified"))?;
        let n_steps = self
            .n_steps
            .ok_or_else(|| PricingError::invalid("n_steps", "must be specified"))?;
        let n_paths = self
            .n_paths
            .ok_or_else(|| PricingError::invalid("n_paths", "must be specified"))?;
        let seed = self
            .seed
            .ok_or_else(|| PricingError::invalid("seed", "must be specified"))?;

        let strike = if variant.is_fixed() { self.strike } else { None };

        let params = SimulationParameters {
            spot,
            volatility,
            rate: self.rate,
            dividend: self.dividend,
            maturity,
            strike,
            variant,
            n_steps,
            n_paths,
            seed,
            workers: self.workers,
        };

        params.validate()?;
        Ok(params)
    }
}
