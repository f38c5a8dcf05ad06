use clap::Args;
use serde_json::Value;

use finsim_core::params::SimulationParameters;

/// Arguments for showing parameters
#[derive(Args)]
pub struct ParamsArgs {
    /// Ignore --params and print the built-in defaults
    #[arg(long)]
    pub defaults: bool,
}

pub fn run_params(args: ParamsArgs, params: &SimulationParameters) -> Result<Value, Box<dyn std::error::Error>> {
    if args.defaults {
        return Ok(serde_json::to_value(SimulationParameters::default())?);
    }
    Ok(serde_json::to_value(params)?)
}
