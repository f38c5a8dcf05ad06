mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::narrative::PromptArgs;
use commands::params::ParamsArgs;
use commands::simulation::{ReportArgs, SimulateArgs, YearArgs};
use commands::valuation::NpvArgs;

/// Year-over-year business simulation for finance classrooms
#[derive(Parser)]
#[command(
    name = "finsim",
    version,
    about = "Year-over-year business simulation for finance classrooms",
    long_about = "Projects a small company one fiscal year at a time from the student's \
                  decisions (volume, pricing, costs, investment, financing, payment terms) \
                  and reports income statement, balance sheet, ratios, break-even and NPV \
                  with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// JSON or YAML file overriding the simulation parameters
    #[arg(long, global = true)]
    params: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a single fiscal year from decisions and the previous year
    Year(YearArgs),
    /// Run a whole plan of yearly decisions
    Simulate(SimulateArgs),
    /// Net present value of a computed history
    Npv(NpvArgs),
    /// Final report with per-year metric classification
    Report(ReportArgs),
    /// Show the effective simulation parameters
    Params(ParamsArgs),
    /// Build the feedback request for a year or for the whole run
    Prompt(PromptArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let params = match input::file::read_params(cli.params.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Year(args) => commands::simulation::run_year(args, &params),
        Commands::Simulate(args) => commands::simulation::run_simulate(args, &params),
        Commands::Npv(args) => commands::valuation::run_npv(args, &params),
        Commands::Report(args) => commands::simulation::run_report(args, &params),
        Commands::Params(args) => commands::params::run_params(args, &params),
        Commands::Prompt(args) => commands::narrative::run_prompt(args),
        Commands::Version => {
            println!("finsim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
