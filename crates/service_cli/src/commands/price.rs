//! Price command implementation
//!
//! Prices one lookback option through the host boundary adapter.

use pricer_lookback::adapter::{price_request, HostRequest, LookbackQuote};
use serde::Serialize;
use tracing::info;

use super::{ContractArgs, Settings};
use crate::config::OutputFormat;
use crate::Result;

/// Priced contract as written to stdout.
#[derive(Debug, Serialize)]
struct PriceReport<'a> {
    variant: String,
    paths: usize,
    steps: usize,
    seed: u64,
    #[serde(flatten)]
    quote: &'a LookbackQuote,
}

/// Run the price command
pub fn run(contract: &ContractArgs, settings: &Settings) -> Result<()> {
    info!(
        variant = %contract.variant,
        paths = settings.paths,
        steps = settings.steps,
        seed = settings.seed,
        "Starting pricing"
    );

    let request = HostRequest {
        spot: contract.spot,
        volatility: contract.volatility,
        rate: contract.rate,
        dividend: contract.dividend,
        maturity: contract.maturity,
        strike: contract.strike,
        variant: contract.variant.code(),
        paths: settings.paths,
        steps: settings.steps,
        seed: Some(settings.seed),
        worker_count: settings.workers,
    };
    let quote = price_request(&request, &settings.engine)?;

    let report = PriceReport {
        variant: contract.variant.to_string(),
        paths: settings.paths,
        steps: settings.steps,
        seed: settings.seed,
        quote: &quote,
    };

    match settings.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&report),
    }

    info!("Pricing complete");
    Ok(())
}

fn print_table(report: &PriceReport<'_>) {
    println!("\n┌────────────────┬──────────────────┐");
    println!("│ {:<14} │ {:>16} │", "Variant", report.variant);
    println!("│ {:<14} │ {:>16} │", "Paths", report.paths);
    println!("│ {:<14} │ {:>16} │", "Steps", report.steps);
    println!("├────────────────┼──────────────────┤");
    println!("│ {:<14} │ {:>16.6} │", "Price", report.quote.price);
    println!("│ {:<14} │ {:>16.6} │", "Std error", report.quote.standard_error);
    println!("│ {:<14} │ {:>16.6} │", "Lower bound", report.quote.lower_bound);
    println!("│ {:<14} │ {:>16.6} │", "Upper bound", report.quote.upper_bound);
    println!("└────────────────┴──────────────────┘");
}
