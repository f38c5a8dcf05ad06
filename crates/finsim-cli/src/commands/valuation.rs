use clap::Args;
use serde_json::{json, Value};

use finsim_core::engine::valuation::calculate_npv;
use finsim_core::params::SimulationParameters;

use super::History;
use crate::input;

/// Arguments for NPV of a computed history
#[derive(Args)]
pub struct NpvArgs {
    /// Path to JSON history (output of `simulate`, or an array of year states)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_npv(args: NpvArgs, params: &SimulationParameters) -> Result<Value, Box<dyn std::error::Error>> {
    let history: History = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <history.json> or stdin required for npv")?;
    let states = history.into_states();

    let npv = calculate_npv(&states, params)?;
    Ok(json!({
        "npv": npv,
        "years": states.len(),
        "initial_cash": params.initial_cash,
        "discount_rate": params.discount_rate,
    }))
}
