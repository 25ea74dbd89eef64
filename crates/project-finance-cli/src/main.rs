mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::model::ModelArgs;

/// Project-finance DCF valuation and debt schedules
#[derive(Parser)]
#[command(
    name = "pfm",
    version,
    about = "Project-finance DCF valuation and debt schedules",
    long_about = "Computes a discounted-cash-flow valuation and a multi-tranche \
                  bullet debt schedule for a capital project with decimal precision: \
                  unlevered and levered cash flows, terminal value, DSCR, NPV, and \
                  unlevered/equity IRR."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full DCF and debt-schedule model from a parameter file
    Model(ModelArgs),
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

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Model(args) => commands::model::run_model(args),
        Commands::Version => {
            println!("pfm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            // Halt without printing partial tables
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
