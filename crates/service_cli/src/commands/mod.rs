//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. The argument groups
//! shared by every command live here.

pub mod greeks;
pub mod price;
pub mod profile;

use clap::Args;
use pricer_lookback::mc::{EngineConfig, PathScheme};
use pricer_lookback::{LookbackVariant, SimulationParameters, WorkerCount};

use crate::config::{confidence_from_level, CliConfig, OutputFormat};
use crate::Result;

/// Contract and market inputs.
#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Lookback variant (fixed-call, fixed-put, floating-call, floating-put)
    #[arg(short = 't', long, default_value = "fixed-call")]
    pub variant: LookbackVariant,

    /// Initial spot price
    #[arg(long, default_value_t = 100.0)]
    pub spot: f64,

    /// Strike, required for fixed-strike variants
    #[arg(short = 'k', long)]
    pub strike: Option<f64>,

    /// Volatility (annualised)
    #[arg(long, default_value_t = 0.2)]
    pub volatility: f64,

    /// Risk-free rate (continuously compounded)
    #[arg(short, long, default_value_t = 0.05, allow_negative_numbers = true)]
    pub rate: f64,

    /// Dividend yield (continuously compounded)
    #[arg(short = 'q', long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub dividend: f64,

    /// Maturity in years
    #[arg(short = 'T', long, default_value_t = 1.0)]
    pub maturity: f64,
}

/// Simulation settings; unset values come from the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Number of Monte Carlo paths
    #[arg(short = 'n', long)]
    pub paths: Option<usize>,

    /// Time steps per path
    #[arg(short, long)]
    pub steps: Option<usize>,

    /// Root seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (default: one per logical CPU)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Two-sided confidence level (0.90, 0.95, 0.99)
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Use antithetic sampling
    #[arg(long)]
    pub antithetic: bool,

    /// Sample extrema from the Brownian bridge between time steps
    #[arg(long)]
    pub bridge: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Run settings after layering flags over the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub paths: usize,
    pub steps: usize,
    pub seed: u64,
    pub workers: Option<usize>,
    pub engine: EngineConfig,
    pub format: OutputFormat,
}

impl Settings {
    /// Resolves `args` against `config`.
    pub fn resolve(args: &RunArgs, config: &CliConfig) -> Result<Self> {
        let confidence = match args.confidence {
            Some(level) => confidence_from_level(level)?,
            None => config.confidence_level()?,
        };
        let scheme = if args.bridge || config.bridge {
            PathScheme::Bridge
        } else {
            PathScheme::LogEuler
        };
        let engine = EngineConfig::builder()
            .confidence(confidence)
            .antithetic(args.antithetic || config.antithetic)
            .scheme(scheme)
            .build()?;
        Ok(Self {
            paths: args.paths.unwrap_or(config.paths),
            steps: args.steps.unwrap_or(config.steps),
            seed: args.seed.unwrap_or(config.seed),
            workers: args.workers.or(config.workers),
            engine,
            format: args.format.unwrap_or(config.format),
        })
    }

    /// Validated simulation parameters for `contract`.
    pub fn parameters(&self, contract: &ContractArgs) -> Result<SimulationParameters> {
        let workers = self.workers.map_or(WorkerCount::Auto, WorkerCount::Fixed);
        let params = SimulationParameters::builder()
            .spot(contract.spot)
            .volatility(contract.volatility)
            .rate(contract.rate)
            .dividend(contract.dividend)
            .maturity(contract.maturity)
            .strike_opt(contract.strike)
            .variant(contract.variant)
            .n_paths(self.paths)
            .n_steps(self.steps)
            .seed(self.seed)
            .workers(workers)
            .build()?;
        Ok(params)
    }
}
