//! # Lookback Option Pricer
//!
//! Monte Carlo pricing of European lookback options under geometric Brownian
//! motion, parallelised over a fixed worker pool with results that do not
//! depend on the number of workers.
//!
//! ## Pipeline
//!
//! ```text
//! adapter ─ validate ─▶ mc::ParallelAggregator ─▶ path + payoff per path
//!                                  │
//!                                  ▼
//!                       ordered reduction ─▶ estimator::finalize
//! ```
//!
//! - [`rng`]: per-path random sub-streams derived from one root seed
//! - [`path`]: log-Euler path simulation tracking running extrema, on the grid
//!   or sampled from the Brownian bridge within each step
//! - [`payoff`]: fixed and floating strike payoffs, undiscounted
//! - [`mc`]: batch planning, parallel simulation, ordered reduction
//! - [`estimator`]: discounted mean, standard error, confidence bounds
//! - [`greeks`] and [`profile`]: bump-and-revalue sensitivities
//! - [`analytical`]: continuous-monitoring closed forms for validation
//! - [`adapter`]: scalar-only entry point with integer status codes
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_lookback::adapter::price_lookback_option;
//! use pricer_lookback::params::LookbackVariant;
//!
//! let quote = price_lookback_option(
//!     100.0, 0.2, 0.05, 0.0, 1.0,
//!     None, LookbackVariant::FloatingCall,
//!     10_000, 100, Some(42), Some(4),
//! )
//! .unwrap();
//!
//! assert!(quote.price > 0.0);
//! assert!(quote.lower_bound <= quote.price && quote.price <= quote.upper_bound);
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for parameters, results and codes

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(unknown_lints)]

pub mod adapter;
pub mod analytical;
pub mod error;
pub mod estimator;
pub mod greeks;
pub mod mc;
pub mod params;
pub mod path;
pub mod payoff;
pub mod profile;
pub mod rng;

pub use adapter::{price_lookback_option, BoundaryError, HostRequest, LookbackQuote};
pub use error::{PricingError, StatusCode};
pub use estimator::{ConfidenceLevel, PricingResult};
pub use greeks::{Greek, GreeksConfig, GreeksResult};
pub use mc::{EngineConfig, LookbackPricer, ParallelAggregator, PathScheme};
pub use params::{LookbackVariant, SimulationParameters, WorkerCount};
