//! Profile command implementation
//!
//! Evaluates price or delta over a grid of spot prices.

use pricer_lookback::profile::{delta_profile, price_profile, SpotProfile};
use pricer_lookback::{GreeksConfig, LookbackPricer};
use tracing::info;

use super::{ContractArgs, Settings};
use crate::config::OutputFormat;
use crate::Result;

/// Run the profile command
pub fn run(
    contract: &ContractArgs,
    settings: &Settings,
    dx: f64,
    delta: bool,
    bumps: &GreeksConfig,
) -> Result<()> {
    let quantity = if delta { "delta" } else { "price" };
    info!(variant = %contract.variant, dx, quantity, "Starting profile");

    let params = settings.parameters(contract)?;
    let pricer = LookbackPricer::new(params, settings.engine);
    let profile = if delta {
        delta_profile(&pricer, dx, bumps)?
    } else {
        price_profile(&pricer, dx)?
    };
    info!(points = profile.len(), "Profile complete");

    match settings.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Table => print_table(&profile, quantity),
    }
    Ok(())
}

fn print_table(profile: &SpotProfile, quantity: &str) {
    println!("\n┌──────────────┬──────────────────┐");
    println!("│ {:<12} │ {:>16} │", "Spot", quantity);
    println!("├──────────────┼──────────────────┤");
    for (spot, value) in profile.points() {
        println!("│ {:>12.4} │ {:>16.6} │", spot, value);
    }
    println!("└──────────────┴──────────────────┘");
}
