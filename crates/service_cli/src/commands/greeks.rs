//! Greeks command implementation
//!
//! Prices one lookback option with bump-and-revalue sensitivities.

use pricer_lookback::{Greek, GreeksConfig, GreeksResult, LookbackPricer};
use tracing::info;

use super::{ContractArgs, Settings};
use crate::config::OutputFormat;
use crate::{CliError, Result};

/// Parses a comma-separated Greek list; empty means all.
pub fn parse_greeks(names: &[String]) -> Result<Vec<Greek>> {
    if names.is_empty() {
        return Ok(Greek::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| match name.trim().to_lowercase().as_str() {
            "delta" => Ok(Greek::Delta),
            "gamma" => Ok(Greek::Gamma),
            "vega" => Ok(Greek::Vega),
            "theta" => Ok(Greek::Theta),
            "rho" => Ok(Greek::Rho),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown greek: {}. Supported: delta, gamma, vega, theta, rho",
                other
            ))),
        })
        .collect()
}

/// Run the greeks command
pub fn run(
    contract: &ContractArgs,
    settings: &Settings,
    greeks: &[String],
    bumps: &GreeksConfig,
) -> Result<()> {
    let selected = parse_greeks(greeks)?;
    info!(variant = %contract.variant, greeks = ?selected, "Starting greeks");

    let params = settings.parameters(contract)?;
    let pricer = LookbackPricer::new(params, settings.engine);
    let result = pricer.price_with_greeks(&selected, bumps)?;

    match settings.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => print_table(&result),
    }

    info!("Greeks complete");
    Ok(())
}

fn print_table(result: &GreeksResult) {
    println!("\n┌────────────┬──────────────────┐");
    println!("│ {:<10} │ {:>16.6} │", "Price", result.price);
    println!("│ {:<10} │ {:>16.6} │", "Std error", result.std_error);
    println!("├────────────┼──────────────────┤");
    for greek in Greek::ALL {
        if let Some(value) = result.get(greek) {
            println!("│ {:<10} │ {:>16.6} │", format!("{:?}", greek), value);
        }
    }
    println!("└────────────┴──────────────────┘");
}
