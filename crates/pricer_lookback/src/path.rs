//! Path simulation with running extrema.
//!
//! A path is advanced step by step under the log-Euler scheme
//!
//! ```text
//! S_{i+1} = S_i · exp((r − q − ½σ²)·dt + σ·√dt·Z_i)
//! ```
//!
//! with a fresh `Z_i` drawn from the path's own [`RandomSubStream`]. Only the
//! current price and the running minimum and maximum are kept, so live state
//! is constant-size regardless of the step count.
//!
//! [`LogEulerSimulator`] observes the extrema on the grid only, which biases
//! lookback prices towards zero for coarse grids. [`BridgeSimulator`] keeps
//! the same grid and additionally samples the minimum and maximum of the
//! Brownian bridge between consecutive grid points. Conditional on the
//! endpoints `x_i`, `x_{i+1}` of a log-price step, the extrema are
//!
//! ```text
//! m_i = exp(½(x_i + x_{i+1}) − ½·√((x_{i+1} − x_i)² − 2σ²·dt·ln U))
//! M_i = exp(½(x_i + x_{i+1}) + ½·√((x_{i+1} − x_i)² − 2σ²·dt·ln U'))
//! ```
//!
//! with independent uniforms `U`, `U'`. Each payoff depends on one extremum
//! only, so the priced quantity is exact in distribution for continuous
//! monitoring.

use crate::params::SimulationParameters;
use crate::rng::RandomSubStream;

/// Transient state of one path under simulation.
///
/// Owned solely by the task simulating the path and dropped once the payoff
/// has been computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathState {
    /// Current price S_i.
    pub price: f64,
    /// Running minimum over S_0..=S_i.
    pub minimum: f64,
    /// Running maximum over S_0..=S_i.
    pub maximum: f64,
    /// Index i of the current step.
    pub step: usize,
}

impl PathState {
    /// Starts a path at `spot`; the initial price counts towards both extrema.
    #[inline]
    pub fn start(spot: f64) -> Self {
        Self {
            price: spot,
            minimum: spot,
            maximum: spot,
            step: 0,
        }
    }

    /// Moves to `price` and updates the running extrema.
    #[inline]
    pub fn advance(&mut self, price: f64) {
        self.price = price;
        self.minimum = self.minimum.min(price);
        self.maximum = self.maximum.max(price);
        self.step += 1;
    }

    /// Moves to `price` and widens the extrema to include `[low, high]`,
    /// the range of the path within the step.
    #[inline]
    pub fn advance_within(&mut self, price: f64, low: f64, high: f64) {
        self.price = price;
        self.minimum = self.minimum.min(low.min(price));
        self.maximum = self.maximum.max(high.max(price));
        self.step += 1;
    }

    /// Completes the path.
    #[inline]
    pub fn finish(self) -> PathExtrema {
        PathExtrema {
            terminal: self.price,
            minimum: self.minimum,
            maximum: self.maximum,
        }
    }
}

/// Summary of a completed path, as consumed by the payoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathExtrema {
    /// Terminal price S_T.
    pub terminal: f64,
    /// Minimum over the path, S_0 included.
    pub minimum: f64,
    /// Maximum over the path, S_0 included.
    pub maximum: f64,
}

impl PathExtrema {
    /// Returns true if every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.terminal.is_finite() && self.minimum.is_finite() && self.maximum.is_finite()
    }
}

/// Simulates single paths from an owned sub-stream.
///
/// The parallel engine is generic over this trait so alternative
/// discretisations (or instrumented ones in tests) can be plugged in.
pub trait PathSimulator: Send + Sync {
    /// Simulates one path, advancing `stream` by the draws it consumes.
    fn simulate(&self, stream: &mut RandomSubStream) -> PathExtrema;
}

/// Log-Euler discretisation of geometric Brownian motion.
///
/// Drift and diffusion per step are computed once at construction.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::params::{LookbackVariant, SimulationParameters};
/// use pricer_lookback::path::{LogEulerSimulator, PathSimulator};
/// use pricer_lookback::rng::RandomSubStream;
///
/// let params = SimulationParameters::builder()
///     .spot(100.0)
///     .volatility(0.2)
///     .maturity(1.0)
///     .variant(LookbackVariant::FloatingCall)
///     .n_paths(1)
///     .n_steps(12)
///     .seed(1)
///     .build()
///     .unwrap();
///
/// let simulator = LogEulerSimulator::new(&params);
/// let path = simulator.simulate(&mut RandomSubStream::new(1, 0));
/// assert!(path.minimum <= 100.0 && path.maximum >= 100.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogEulerSimulator {
    spot: f64,
    n_steps: usize,
    /// (r − q − ½σ²)·dt
    drift: f64,
    /// σ·√dt
    diffusion: f64,
}

impl LogEulerSimulator {
    /// Creates a simulator for the given parameters.
    pub fn new(params: &SimulationParameters) -> Self {
        let dt = params.dt();
        let sigma = params.volatility();
        Self {
            spot: params.spot(),
            n_steps: params.n_steps(),
            drift: (params.rate() - params.dividend() - 0.5 * sigma * sigma) * dt,
            diffusion: sigma * dt.sqrt(),
        }
    }

    /// Log-price increment per step excluding noise.
    #[inline]
    pub fn drift(&self) -> f64 {
        self.drift
    }

    /// Noise scale per step.
    #[inline]
    pub fn diffusion(&self) -> f64 {
        self.diffusion
    }
}

impl PathSimulator for LogEulerSimulator {
    #[inline]
    fn simulate(&self, stream: &mut RandomSubStream) -> PathExtrema {
        let mut state = PathState::start(self.spot);
        while state.step < self.n_steps {
            let z = stream.next_normal();
            let next = state.price * (self.drift + self.diffusion * z).exp();
            state.advance(next);
        }
        state.finish()
    }
}

/// Uniforms are kept this far from 0 and 1 before taking logarithms.
const UNIFORM_EPS: f64 = 1e-15;

/// Log-Euler grid with extrema sampled from the Brownian bridge within each
/// step.
///
/// Per step it draws one normal for the grid increment, then one uniform
/// for the minimum and one for the maximum. Terminal prices follow the same
/// law as [`LogEulerSimulator`].
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::params::{LookbackVariant, SimulationParameters};
/// use pricer_lookback::path::{BridgeSimulator, PathSimulator};
/// use pricer_lookback::rng::RandomSubStream;
///
/// let params = SimulationParameters::builder()
///     .spot(100.0)
///     .volatility(0.2)
///     .maturity(1.0)
///     .variant(LookbackVariant::FloatingCall)
///     .n_paths(1)
///     .n_steps(12)
///     .seed(1)
///     .build()
///     .unwrap();
///
/// let path = BridgeSimulator::new(&params).simulate(&mut RandomSubStream::new(1, 0));
/// assert!(path.minimum < 100.0 && path.maximum > 100.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeSimulator {
    grid: LogEulerSimulator,
    /// 2σ²·dt
    bridge_variance: f64,
}

impl BridgeSimulator {
    /// Creates a simulator for the given parameters.
    pub fn new(params: &SimulationParameters) -> Self {
        let sigma = params.volatility();
        Self {
            grid: LogEulerSimulator::new(params),
            bridge_variance: 2.0 * sigma * sigma * params.dt(),
        }
    }

    /// Half-width in log space of the sampled excursion beyond the step
    /// midpoint.
    #[inline]
    fn half_range(&self, increment: f64, u: f64) -> f64 {
        let u = u.clamp(UNIFORM_EPS, 1.0 - UNIFORM_EPS);
        let radicand = increment * increment - self.bridge_variance * u.ln();
        0.5 * radicand.max(0.0).sqrt()
    }
}

impl PathSimulator for BridgeSimulator {
    #[inline]
    fn simulate(&self, stream: &mut RandomSubStream) -> PathExtrema {
        let mut state = PathState::start(self.grid.spot);
        while state.step < self.grid.n_steps {
            let z = stream.next_normal();
            let increment = self.grid.drift + self.grid.diffusion * z;
            let mid = 0.5 * increment;
            let low = state.price * (mid - self.half_range(increment, stream.next_uniform())).exp();
            let high = state.price * (mid + self.half_range(increment, stream.next_uniform())).exp();
            state.advance_within(state.price * increment.exp(), low, high);
        }
        state.finish()
    }
}

/// Simulates one path of `params` from `stream`.
///
/// Convenience wrapper over [`LogEulerSimulator`].
#[inline]
pub fn simulate_path(params: &SimulationParameters, stream: &mut RandomSubStream) -> PathExtrema {
    LogEulerSimulator::new(params).simulate(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LookbackVariant;
    use approx::assert_relative_eq;

    fn params(volatility: f64, n_steps: usize) -> SimulationParameters {
        SimulationParameters::builder()
            .spot(100.0)
            .volatility(volatility)
            .rate(0.05)
            .maturity(1.0)
            .variant(LookbackVariant::FloatingCall)
            .n_paths(1)
            .n_steps(n_steps)
            .seed(11)
            .build()
            .unwrap()
    }

    #[test]
    fn test_state_tracks_extrema() {
        let mut state = PathState::start(100.0);
        state.advance(110.0);
        state.advance(90.0);
        state.advance(105.0);
        let path = state.finish();
        assert_eq!(path.terminal, 105.0);
        assert_eq!(path.minimum, 90.0);
        assert_eq!(path.maximum, 110.0);
    }

    #[test]
    fn test_extrema_include_spot() {
        let p = params(0.3, 50);
        for index in 0..100 {
            let path = simulate_path(&p, &mut RandomSubStream::new(3, index));
            assert!(path.minimum <= 100.0);
            assert!(path.maximum >= 100.0);
            assert!(path.minimum <= path.terminal && path.terminal <= path.maximum);
        }
    }

    #[test]
    fn test_one_step_is_two_point_path() {
        let p = params(0.2, 1);
        let mut stream = RandomSubStream::new(8, 0);
        let path = simulate_path(&p, &mut stream);
        assert_eq!(stream.draws(), 1);
        assert_eq!(path.minimum, path.terminal.min(100.0));
        assert_eq!(path.maximum, path.terminal.max(100.0));
    }

    #[test]
    fn test_consumes_one_draw_per_step() {
        let p = params(0.2, 252);
        let mut stream = RandomSubStream::new(8, 0);
        simulate_path(&p, &mut stream);
        assert_eq!(stream.draws(), 252);
    }

    #[test]
    fn test_zero_volatility_is_deterministic_growth() {
        let p = params(0.0, 100);
        let path = simulate_path(&p, &mut RandomSubStream::new(1, 0));
        assert_relative_eq!(path.terminal, 100.0 * 0.05_f64.exp(), max_relative = 1e-12);
        assert_eq!(path.minimum, 100.0);
        assert_relative_eq!(path.maximum, path.terminal);
    }

    #[test]
    fn test_same_stream_same_path() {
        let p = params(0.25, 64);
        let a = simulate_path(&p, &mut RandomSubStream::new(77, 12));
        let b = simulate_path(&p, &mut RandomSubStream::new(77, 12));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bridge_extrema_enclose_grid() {
        let p = params(0.3, 12);
        let simulator = BridgeSimulator::new(&p);
        for index in 0..200 {
            let mut stream = RandomSubStream::new(5, index);
            let path = simulator.simulate(&mut stream);
            assert_eq!(stream.draws(), 12);
            assert!(path.minimum < 100.0 && path.maximum > 100.0);
            assert!(path.minimum < path.terminal && path.terminal < path.maximum);
        }
    }

    #[test]
    fn test_bridge_terminal_matches_grid_law() {
        let p = params(0.25, 1);
        let bridge = BridgeSimulator::new(&p);
        let grid = LogEulerSimulator::new(&p);
        // one step: the normal is the first draw for both
        let a = bridge.simulate(&mut RandomSubStream::new(9, 3));
        let b = grid.simulate(&mut RandomSubStream::new(9, 3));
        assert_eq!(a.terminal, b.terminal);
        assert!(a.minimum <= b.minimum && a.maximum >= b.maximum);
    }

    #[test]
    fn test_bridge_zero_volatility_matches_grid() {
        let p = params(0.0, 50);
        let a = BridgeSimulator::new(&p).simulate(&mut RandomSubStream::new(1, 0));
        let b = LogEulerSimulator::new(&p).simulate(&mut RandomSubStream::new(1, 0));
        assert_relative_eq!(a.terminal, b.terminal, max_relative = 1e-12);
        assert_eq!(a.minimum, 100.0);
        assert_relative_eq!(a.maximum, b.maximum, max_relative = 1e-12);
    }

    #[test]
    fn test_bridge_half_range_at_extreme_uniforms() {
        let simulator = BridgeSimulator::new(&params(0.2, 10));
        assert_relative_eq!(simulator.half_range(0.03, 1.0), 0.015, max_relative = 1e-9);
        assert!(simulator.half_range(0.0, 0.0).is_finite());
        assert!(simulator.half_range(0.0, 0.0) > 0.0);
    }

    #[test]
    fn test_antithetic_terminal_is_mirror_in_log_space() {
        let p = params(0.2, 10);
        let simulator = LogEulerSimulator::new(&p);
        let stream = RandomSubStream::new(4, 4);
        let up = simulator.simulate(&mut stream.clone());
        let down = simulator.simulate(&mut stream.antithetic());
        let drift_total = 10.0 * simulator.drift();
        let log_up = (up.terminal / 100.0).ln() - drift_total;
        let log_down = (down.terminal / 100.0).ln() - drift_total;
        assert_relative_eq!(log_up, -log_down, epsilon = 1e-10);
    }
}
