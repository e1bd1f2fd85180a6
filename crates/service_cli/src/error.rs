//! CLI error types.

use pricer_lookback::{BoundaryError, PricingError};
use thiserror::Error;

/// Errors surfaced by the `lookback` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// A command-line value could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The configuration file is unreadable or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The pricing engine rejected the request or failed.
    #[error("Pricing failed: {0}")]
    Pricing(#[from] PricingError),

    /// The boundary adapter returned a status code.
    #[error("Pricing failed: {0}")]
    Boundary(#[from] BoundaryError),

    /// Output could not be serialised.
    #[error("Serialisation error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
