//! Host boundary.
//!
//! A narrow, synchronous entry point for callers that can only exchange
//! scalars and fixed-size records, such as a spreadsheet add-in. Every call
//! is stateless and reproducible from its inputs.
//!
//! All inputs are validated before any simulation work is scheduled. A call
//! yields either a complete [`LookbackQuote`] or a [`BoundaryError`], never
//! both.

use tracing::warn;

use crate::error::{PricingError, StatusCode};
use crate::estimator::PricingResult;
use crate::mc::{EngineConfig, ParallelAggregator, PathScheme};
use crate::params::{LookbackVariant, SimulationParameters, WorkerCount};
use crate::path::{BridgeSimulator, LogEulerSimulator, PathSimulator};

/// Fixed-size pricing output.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookbackQuote {
    /// Discounted price estimate.
    pub price: f64,
    /// Standard error of the estimate.
    pub standard_error: f64,
    /// Lower confidence bound.
    pub lower_bound: f64,
    /// Upper confidence bound.
    pub upper_bound: f64,
}

impl From<PricingResult> for LookbackQuote {
    fn from(result: PricingResult) -> Self {
        Self {
            price: result.price,
            standard_error: result.std_error,
            lower_bound: result.lower_bound,
            upper_bound: result.upper_bound,
        }
    }
}

/// Status code and message returned to the host on failure.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryError {
    /// Error category.
    pub code: StatusCode,
    /// Human-readable description.
    pub message: String,
}

impl From<PricingError> for BoundaryError {
    fn from(err: PricingError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_i32(), self.message)
    }
}

impl std::error::Error for BoundaryError {}

/// Raw scalar inputs as received from a host.
///
/// `variant` is the integer code from [`LookbackVariant::code`]. A missing
/// seed is rejected rather than defaulted, so every call is reproducible.
/// A missing worker count means one worker per logical CPU.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostRequest {
    /// Initial spot price.
    pub spot: f64,
    /// Volatility.
    pub volatility: f64,
    /// Risk-free rate.
    pub rate: f64,
    /// Dividend yield.
    pub dividend: f64,
    /// Maturity in years.
    pub maturity: f64,
    /// Strike, required for fixed-strike variants.
    pub strike: Option<f64>,
    /// Variant code.
    pub variant: i32,
    /// Number of paths.
    pub paths: usize,
    /// Number of time steps.
    pub steps: usize,
    /// Root seed.
    pub seed: Option<u64>,
    /// Worker count override.
    pub worker_count: Option<usize>,
}

impl HostRequest {
    /// Converts the raw inputs into validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an unknown variant code or any
    /// violated parameter invariant.
    pub fn to_parameters(&self) -> Result<SimulationParameters, PricingError> {
        let variant = LookbackVariant::try_from(self.variant)?;
        let workers = match self.worker_count {
            Some(n) => WorkerCount::Fixed(n),
            None => WorkerCount::Auto,
        };
        SimulationParameters::builder()
            .spot(self.spot)
            .volatility(self.volatility)
            .rate(self.rate)
            .dividend(self.dividend)
            .maturity(self.maturity)
            .strike_opt(self.strike)
            .variant(variant)
            .n_paths(self.paths)
            .n_steps(self.steps)
            .seed_opt(self.seed)
            .workers(workers)
            .build()
    }
}

/// Prices a lookback option from scalar inputs with the default engine
/// configuration.
///
/// # Errors
///
/// Returns a [`BoundaryError`] carrying the status code of the first
/// failure.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::adapter::price_lookback_option;
/// use pricer_lookback::error::StatusCode;
/// use pricer_lookback::params::LookbackVariant;
///
/// let quote = price_lookback_option(
///     100.0, 0.2, 0.05, 0.0, 1.0,
///     Some(100.0), LookbackVariant::FixedCall,
///     4_000, 50, Some(42), Some(2),
/// )
/// .unwrap();
/// assert!(quote.lower_bound < quote.price && quote.price < quote.upper_bound);
///
/// let err = price_lookback_option(
///     100.0, -0.1, 0.05, 0.0, 1.0,
///     Some(100.0), LookbackVariant::FixedCall,
///     4_000, 50, Some(42), Some(2),
/// )
/// .unwrap_err();
/// assert_eq!(err.code, StatusCode::InvalidParameter);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn price_lookback_option(
    spot: f64,
    volatility: f64,
    rate: f64,
    dividend: f64,
    maturity: f64,
    strike: Option<f64>,
    variant: LookbackVariant,
    paths: usize,
    steps: usize,
    seed: Option<u64>,
    worker_count: Option<usize>,
) -> Result<LookbackQuote, BoundaryError> {
    let request = HostRequest {
        spot,
        volatility,
        rate,
        dividend,
        maturity,
        strike,
        variant: variant.code(),
        paths,
        steps,
        seed,
        worker_count,
    };
    price_request(&request, &EngineConfig::default())
}

/// Prices `request` under `config`, with the simulator selected by
/// [`EngineConfig::scheme`].
///
/// # Errors
///
/// As [`price_lookback_option`].
pub fn price_request(
    request: &HostRequest,
    config: &EngineConfig,
) -> Result<LookbackQuote, BoundaryError> {
    match config.scheme() {
        PathScheme::LogEuler => price_request_with(request, config, LogEulerSimulator::new),
        PathScheme::Bridge => price_request_with(request, config, BridgeSimulator::new),
    }
}

/// Prices `request` with a simulator built by `make_simulator`.
///
/// `make_simulator` is only invoked once the request has been validated.
///
/// # Errors
///
/// As [`price_lookback_option`].
pub fn price_request_with<S, F>(
    request: &HostRequest,
    config: &EngineConfig,
    make_simulator: F,
) -> Result<LookbackQuote, BoundaryError>
where
    S: PathSimulator,
    F: FnOnce(&SimulationParameters) -> S,
{
    let outcome = request.to_parameters().and_then(|params| {
        let simulator = make_simulator(&params);
        ParallelAggregator::new(*config).run_with(&params, params.workers().resolve(), &simulator)
    });

    match outcome {
        Ok(result) => Ok(result.into()),
        Err(err) => {
            let err = BoundaryError::from(err);
            warn!(code = err.code.as_i32(), message = %err.message, "pricing request failed");
            Err(err)
        }
    }
}
