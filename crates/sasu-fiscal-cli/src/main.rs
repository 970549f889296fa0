mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::compute::ComputeArgs;
use commands::optimize::OptimizeArgs;
use commands::TableSource;

/// Taxation and salary/dividend optimisation for French SASU presidents
#[derive(Parser)]
#[command(
    name = "sasu",
    version,
    about = "Taxation and salary/dividend optimisation for French SASU presidents",
    long_about = "A CLI computing social contributions, corporate tax, dividend taxation \
                  and household income tax for a SASU and its president, with decimal \
                  precision, and searching the salary/dividend split that best fits a \
                  preference profile."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Fiscal year of the built-in rate table
    #[arg(long, default_value_t = 2025, global = true)]
    year: i32,

    /// JSON or YAML rate table to use instead of the built-in one
    #[arg(long, global = true)]
    rates: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "sasu_fiscal_core=trace")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full fiscal waterfall for one scenario
    Compute(ComputeArgs),
    /// Search the salary/dividend split for a scenario
    Optimize(OptimizeArgs),
    /// Print the rate table in use
    Rates,
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

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let tables = TableSource {
        year: cli.year,
        rates: cli.rates,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compute(args) => commands::compute::run_compute(args, &tables),
        Commands::Optimize(args) => commands::optimize::run_optimize(args, &tables),
        Commands::Rates => commands::rates::run_rates(&tables),
        Commands::Version => {
            println!("sasu {}", env!("CARGO_PKG_VERSION"));
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
