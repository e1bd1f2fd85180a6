//! Lookback CLI - Command Line Pricing of Lookback Options
//!
//! Operational entry point for the `pricer_lookback` engine.
//!
//! # Commands
//!
//! - `lookback price` - Price one contract with confidence bounds
//! - `lookback greeks` - Price with bump-and-revalue sensitivities
//! - `lookback profile` - Price or delta over a grid of spot prices
//!
//! Run defaults (paths, steps, seed, workers, confidence level, antithetic
//! sampling, output format) are read from `lookback.toml` when present.

use std::path::Path;

use clap::{Parser, Subcommand};
use pricer_lookback::GreeksConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::{ContractArgs, RunArgs, Settings};
use config::CliConfig;

/// Monte Carlo lookback option pricer
#[derive(Parser)]
#[command(name = "lookback")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "lookback.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a lookback option
    Price {
        #[command(flatten)]
        contract: ContractArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Price a lookback option with Greeks
    Greeks {
        #[command(flatten)]
        contract: ContractArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Greeks to compute, comma separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        greeks: Vec<String>,

        /// Relative spot bump
        #[arg(long, default_value_t = 0.01)]
        spot_bump: f64,
    },

    /// Evaluate price or delta over a grid of spots
    Profile {
        #[command(flatten)]
        contract: ContractArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Grid step as a fraction of spot
        #[arg(long, default_value_t = 0.1)]
        dx: f64,

        /// Profile delta instead of price
        #[arg(long)]
        delta: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = CliConfig::load(Path::new(&cli.config))?;

    match cli.command {
        Commands::Price { contract, run } => {
            let settings = Settings::resolve(&run, &config)?;
            commands::price::run(&contract, &settings)
        }
        Commands::Greeks {
            contract,
            run,
            greeks,
            spot_bump,
        } => {
            let settings = Settings::resolve(&run, &config)?;
            let bumps = GreeksConfig {
                spot_bump_relative: spot_bump,
                ..GreeksConfig::default()
            };
            commands::greeks::run(&contract, &settings, &greeks, &bumps)
        }
        Commands::Profile {
            contract,
            run,
            dx,
            delta,
        } => {
            let settings = Settings::resolve(&run, &config)?;
            commands::profile::run(&contract, &settings, dx, delta, &GreeksConfig::default())
        }
    }
}
