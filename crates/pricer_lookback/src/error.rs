//! Error types for lookback pricing.
//!
//! This module provides:
//! - `PricingError`: every failure a pricing run can report
//! - `StatusCode`: the fixed integer codes surfaced at the host boundary

use thiserror::Error;

/// Categorised pricing errors.
///
/// Parameter problems are detected once, before any simulation work is
/// scheduled. The remaining variants can only arise during or after a run.
///
/// # Variants
/// - `InvalidParameter`: a simulation input violates its invariant
/// - `InsufficientSamples`: fewer than two paths, sample variance undefined
/// - `SimulationFailure`: a path produced a non-finite value, or the worker
///   pool could not be started
/// - `InternalReductionError`: merged path count differs from the requested count
///
/// # Examples
/// ```
/// use pricer_lookback::error::PricingError;
///
/// let err = PricingError::invalid("volatility", "must be non-negative, got -0.1");
/// assert_eq!(
///     format!("{}", err),
///     "Invalid parameter 'volatility': must be non-negative, got -0.1"
/// );
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    /// A simulation input violates its invariant.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the violation.
        reason: String,
    },

    /// Sample variance is undefined for fewer than two paths.
    #[error("Insufficient samples: {paths} path(s), at least 2 required")]
    InsufficientSamples {
        /// Requested path count.
        paths: usize,
    },

    /// A worker produced a non-finite value.
    #[error("Simulation failure at path {path_index}: {reason}")]
    SimulationFailure {
        /// Global index of the offending path.
        path_index: usize,
        /// Description of the failure.
        reason: String,
    },

    /// Merged partial counts do not add up to the requested path count.
    #[error("Internal reduction error: merged {actual} paths, expected {expected}")]
    InternalReductionError {
        /// Requested path count.
        expected: usize,
        /// Count observed after the reduction.
        actual: usize,
    },
}

impl PricingError {
    /// Shorthand for [`PricingError::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Returns the boundary status code for this error.
    pub fn code(&self) -> StatusCode {
        match self {
            Self::InvalidParameter { .. } => StatusCode::InvalidParameter,
            Self::InsufficientSamples { .. } => StatusCode::InsufficientSamples,
            Self::SimulationFailure { .. } => StatusCode::SimulationFailure,
            Self::InternalReductionError { .. } => StatusCode::InternalReductionError,
        }
    }
}

/// Status codes exchanged with a host caller.
///
/// Values are stable; hosts may persist or switch on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum StatusCode {
    /// Pricing succeeded.
    Ok = 0,
    /// See [`PricingError::InvalidParameter`].
    InvalidParameter = 1,
    /// See [`PricingError::InsufficientSamples`].
    InsufficientSamples = 2,
    /// See [`PricingError::SimulationFailure`].
    SimulationFailure = 3,
    /// See [`PricingError::InternalReductionError`].
    InternalReductionError = 4,
}

impl StatusCode {
    /// Returns the raw integer value.
    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
