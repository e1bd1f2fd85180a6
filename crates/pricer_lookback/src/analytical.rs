//! Closed-form prices for continuously monitored lookback options.
//!
//! Floating-strike prices follow Goldman, Sosin and Gatto (1979); fixed-strike
//! prices follow Conze and Viswanathan (1991). Both assume the contract is
//! written today, so the running extremum starts at spot.
//!
//! The Monte Carlo engine monitors the path only at the `n_steps` grid
//! points, which biases the observed maximum down and the minimum up. These
//! prices are therefore an upper bound for the simulated ones and converge
//! to them as the grid is refined.

use std::f64::consts::SQRT_2;

use crate::error::PricingError;
use crate::params::{LookbackVariant, SimulationParameters};

/// Cost of carry below which the formulas are evaluated by symmetric
/// perturbation, since they divide by it.
const CARRY_EPSILON: f64 = 1.0e-8;

const CARRY_PERTURBATION: f64 = 1.0e-5;

/// Standard normal cumulative distribution function.
///
/// Abramowitz and Stegun 7.1.26 complementary error function, with absolute
/// error below 1.5e-7.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::analytical::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!((norm_cdf(1.959964) - 0.975).abs() < 1e-6);
/// ```
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * z);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    let tail = poly * (-z * z).exp();
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

/// Market inputs shared by every formula.
#[derive(Clone, Copy, Debug)]
struct Market {
    spot: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
    maturity: f64,
}

impl Market {
    #[inline]
    fn carry(&self) -> f64 {
        self.rate - self.dividend
    }

    /// Same market with the dividend moved so the carry is `carry`.
    #[inline]
    fn with_carry(self, carry: f64) -> Self {
        Self {
            dividend: self.rate - carry,
            ..self
        }
    }
}

/// Continuous-monitoring price of the contract described by `params`.
///
/// Path count, step count, seed and worker count are ignored.
///
/// # Errors
///
/// Returns `InvalidParameter` if `params` fail validation.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::analytical::continuous_price;
/// use pricer_lookback::params::{LookbackVariant, SimulationParameters};
///
/// let params = SimulationParameters::builder()
///     .spot(100.0)
///     .volatility(0.2)
///     .rate(0.05)
///     .maturity(1.0)
///     .variant(LookbackVariant::FloatingCall)
///     .n_paths(1)
///     .n_steps(1)
///     .seed(0)
///     .build()
///     .unwrap();
///
/// let price = continuous_price(&params).unwrap();
/// assert!(price > 15.0 && price < 20.0);
/// ```
pub fn continuous_price(params: &SimulationParameters) -> Result<f64, PricingError> {
    params.validate()?;
    let market = Market {
        spot: params.spot(),
        rate: params.rate(),
        dividend: params.dividend(),
        volatility: params.volatility(),
        maturity: params.maturity(),
    };
    let strike = params.strike().unwrap_or(0.0);

    if market.volatility <= 0.0 {
        return Ok(deterministic_price(params.variant(), strike, &market));
    }

    let price = match params.variant() {
        LookbackVariant::FloatingCall => smoothed(market, floating_call),
        LookbackVariant::FloatingPut => smoothed(market, floating_put),
        LookbackVariant::FixedCall => smoothed(market, |m| fixed_call(m, strike)),
        LookbackVariant::FixedPut => smoothed(market, |m| fixed_put(m, strike)),
    };
    Ok(price)
}

/// Evaluates `formula`, averaging over a carry of `±ε` when the carry is
/// effectively zero.
fn smoothed(market: Market, formula: impl Fn(&Market) -> f64) -> f64 {
    if market.carry().abs() < CARRY_EPSILON {
        let hi = formula(&market.with_carry(CARRY_PERTURBATION));
        let lo = formula(&market.with_carry(-CARRY_PERTURBATION));
        0.5 * (hi + lo)
    } else {
        formula(&market)
    }
}

/// With zero volatility the path is `S0·exp((r−q)t)`, monotone in `t`.
fn deterministic_price(variant: LookbackVariant, strike: f64, m: &Market) -> f64 {
    let terminal = m.spot * (m.carry() * m.maturity).exp();
    let minimum = m.spot.min(terminal);
    let maximum = m.spot.max(terminal);
    let payoff = match variant {
        LookbackVariant::FixedCall => (maximum - strike).max(0.0),
        LookbackVariant::FixedPut => (strike - minimum).max(0.0),
        LookbackVariant::FloatingCall => terminal - minimum,
        LookbackVariant::FloatingPut => maximum - terminal,
    };
    (-m.rate * m.maturity).exp() * payoff
}

/// Terms common to every formula for a reference level `level`.
struct Terms {
    d1: f64,
    d2: f64,
    /// `d1 − 2b√T/σ`
    d3: f64,
    /// `(S/level)^(−2b/σ²)`
    power: f64,
    df_r: f64,
    df_q: f64,
    /// `S·e^{−rT}·σ²/(2b)`
    scale: f64,
    /// `e^{bT}`
    growth: f64,
}

impl Terms {
    fn new(m: &Market, level: f64) -> Self {
        let b = m.carry();
        let vol_sq = m.volatility * m.volatility;
        let sqrt_t = m.maturity.sqrt();
        let sig_sqrt_t = m.volatility * sqrt_t;
        let d1 = ((m.spot / level).ln() + (b + 0.5 * vol_sq) * m.maturity) / sig_sqrt_t;
        let df_r = (-m.rate * m.maturity).exp();
        Self {
            d1,
            d2: d1 - sig_sqrt_t,
            d3: d1 - 2.0 * b * sqrt_t / m.volatility,
            power: (m.spot / level).powf(-2.0 * b / vol_sq),
            df_r,
            df_q: (-m.dividend * m.maturity).exp(),
            scale: m.spot * df_r * vol_sq / (2.0 * b),
            growth: (b * m.maturity).exp(),
        }
    }
}

fn floating_call(m: &Market) -> f64 {
    let t = Terms::new(m, m.spot);
    m.spot * t.df_q * norm_cdf(t.d1) - m.spot * t.df_r * norm_cdf(t.d2)
        + t.scale * (t.power * norm_cdf(-t.d3) - t.growth * norm_cdf(-t.d1))
}

fn floating_put(m: &Market) -> f64 {
    let t = Terms::new(m, m.spot);
    m.spot * t.df_r * norm_cdf(-t.d2) - m.spot * t.df_q * norm_cdf(-t.d1)
        + t.scale * (t.growth * norm_cdf(t.d1) - t.power * norm_cdf(t.d3))
}

fn fixed_call(m: &Market, strike: f64) -> f64 {
    if strike > m.spot {
        let t = Terms::new(m, strike);
        m.spot * t.df_q * norm_cdf(t.d1) - strike * t.df_r * norm_cdf(t.d2)
            + t.scale * (t.growth * norm_cdf(t.d1) - t.power * norm_cdf(t.d3))
    } else {
        let t = Terms::new(m, m.spot);
        t.df_r * (m.spot - strike) + m.spot * t.df_q * norm_cdf(t.d1)
            - m.spot * t.df_r * norm_cdf(t.d2)
            + t.scale * (t.growth * norm_cdf(t.d1) - t.power * norm_cdf(t.d3))
    }
}

fn fixed_put(m: &Market, strike: f64) -> f64 {
    if strike < m.spot {
        let t = Terms::new(m, strike);
        strike * t.df_r * norm_cdf(-t.d2) - m.spot * t.df_q * norm_cdf(-t.d1)
            + t.scale * (t.power * norm_cdf(-t.d3) - t.growth * norm_cdf(-t.d1))
    } else {
        let t = Terms::new(m, m.spot);
        t.df_r * (strike - m.spot) + m.spot * t.df_r * norm_cdf(-t.d2)
            - m.spot * t.df_q * norm_cdf(-t.d1)
            + t.scale * (t.power * norm_cdf(-t.d3) - t.growth * norm_cdf(-t.d1))
    }
}
