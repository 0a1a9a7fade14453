mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::returns::ReturnsArgs;
use commands::risk::RiskArgs;
use commands::simulate::{PathsArgs, SimulateArgs};
use commands::stress::StressArgs;

/// Stochastic price-path simulation and risk statistics
#[derive(Parser)]
#[command(
    name = "msim",
    version,
    about = "Stochastic price-path simulation and risk statistics",
    long_about = "Monte Carlo price simulation over a daily closing-price series. \
                  Estimates drift and volatility from historical returns, simulates \
                  GBM, jump-diffusion, mean-reversion, or bootstrap paths, and reports \
                  quantile, Value-at-Risk, and Expected-Shortfall statistics, \
                  optionally across named stress scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate drift/volatility and analyze the daily-return distribution
    Returns(ReturnsArgs),
    /// Simulate the final-price distribution
    Simulate(SimulateArgs),
    /// Simulate full price paths for plotting
    Paths(PathsArgs),
    /// Risk report (quantile, VaR, Expected Shortfall) for a simulated or
    /// supplied distribution
    Risk(RiskArgs),
    /// Compare risk reports across stress scenarios
    Stress(StressArgs),
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
        Commands::Returns(args) => commands::returns::run_returns(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Paths(args) => commands::simulate::run_paths(args),
        Commands::Risk(args) => commands::risk::run_risk(args),
        Commands::Stress(args) => commands::stress::run_stress(args),
        Commands::Version => {
            println!("msim {}", env!("CARGO_PKG_VERSION"));
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
