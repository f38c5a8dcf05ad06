use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use finsim_core::engine::model::{YearInput, YearState};
use finsim_core::engine::year::calculate_year;
use finsim_core::params::SimulationParameters;
use finsim_core::simulation::report::{build_final_report, summarise_year};
use finsim_core::simulation::state::SimulationState;

use super::{History, Plan};
use crate::input;

/// Arguments for a single simulated year
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct YearArgs {
    /// Path to JSON file with the year's decisions (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON file with the previous year's computed state
    #[arg(long)]
    pub previous: Option<String>,

    /// Year number (defaults to the previous year + 1, or 1)
    #[arg(long)]
    pub year: Option<u32>,

    /// Units sold during the year
    #[arg(long, default_value = "1000")]
    pub units_sold: Decimal,

    /// Selling price per unit
    #[arg(long, default_value = "20")]
    pub unit_price: Decimal,

    /// Variable cost per unit
    #[arg(long, default_value = "10")]
    pub unit_variable_cost: Decimal,

    /// Fixed costs for the year
    #[arg(long, default_value = "5000")]
    pub fixed_costs: Decimal,

    /// Additions to fixed assets
    #[arg(long, default_value = "0")]
    pub new_investment: Decimal,

    /// New borrowing
    #[arg(long, default_value = "0")]
    pub new_loans: Decimal,

    /// Capital increase
    #[arg(long, default_value = "0")]
    pub new_equity: Decimal,

    /// Average days customers take to pay
    #[arg(long, default_value = "30")]
    pub collection_days: Decimal,

    /// Average days taken to pay suppliers
    #[arg(long, default_value = "30")]
    pub payment_days: Decimal,
}

/// Arguments for a multi-year run
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON plan: an array of yearly decisions or {"years": [...]}
    #[arg(long)]
    pub input: Option<String>,

    /// Print one summary row per year instead of the full states
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for the final report
#[derive(Args)]
pub struct ReportArgs {
    /// Path to JSON history (output of `simulate`, or an array of year states)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_year(args: YearArgs, params: &SimulationParameters) -> Result<Value, Box<dyn std::error::Error>> {
    let previous: Option<YearState> = match args.previous {
        Some(ref path) => Some(input::file::read_json(path)?),
        None => None,
    };

    let year_input: YearInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        YearInput::from_value(data)?
    } else {
        YearInput {
            units_sold: args.units_sold,
            unit_price: args.unit_price,
            unit_variable_cost: args.unit_variable_cost,
            fixed_costs: args.fixed_costs,
            new_investment: args.new_investment,
            new_loans: args.new_loans,
            new_equity: args.new_equity,
            collection_days: args.collection_days,
            payment_days: args.payment_days,
        }
    };

    let year = args
        .year
        .unwrap_or_else(|| previous.as_ref().map_or(1, |p| p.year + 1));

    let state = calculate_year(&year_input, year, previous.as_ref(), params)?;
    Ok(serde_json::to_value(state)?)
}

pub fn run_simulate(
    args: SimulateArgs,
    params: &SimulationParameters,
) -> Result<Value, Box<dyn std::error::Error>> {
    let plan: Plan = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <plan.json> or stdin required for simulate")?;
    let inputs = plan.into_inputs();

    let total_years = u32::try_from(inputs.len())?;
    let mut state = SimulationState::start(total_years)?;
    for year_input in inputs {
        state = state.advance(year_input, params)?;
    }

    let npv = state.npv(params)?;
    let results = if args.summary {
        serde_json::to_value(state.results.iter().map(summarise_year).collect::<Vec<_>>())?
    } else {
        serde_json::to_value(&state.results)?
    };

    Ok(json!({
        "results": results,
        "npv": npv,
    }))
}

pub fn run_report(args: ReportArgs, params: &SimulationParameters) -> Result<Value, Box<dyn std::error::Error>> {
    let history: History = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <history.json> or stdin required for report")?;

    let report = build_final_report(&history.into_states(), params)?;
    Ok(serde_json::to_value(report)?)
}
