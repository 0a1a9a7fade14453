use clap::Args;
use serde_json::Value;

use marketsim_core::simulation::{
    run_full_simulation, run_simulation, SimulationConfig, SimulationInput,
};

use crate::commands::{parse_model, resolve_start_price};
use crate::input;

/// Arguments for the final-price distribution simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON or CSV price file (Date/Close columns)
    #[arg(long)]
    pub input: Option<String>,

    /// Full SimulationInput JSON file; overrides the other flags
    #[arg(long)]
    pub config: Option<String>,

    /// Starting price (default: last observed close)
    #[arg(long)]
    pub start_price: Option<f64>,

    /// Path length in steps
    #[arg(long, default_value_t = 365)]
    pub days: usize,

    /// Number of independent paths
    #[arg(long, default_value_t = 10_000)]
    pub num_simulations: usize,

    /// Price model: gbm, jump-diffusion, mean-reversion, bootstrap
    #[arg(long, default_value = "gbm")]
    pub model: String,

    /// Base seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Histogram bins for the final-price distribution
    #[arg(long)]
    pub bins: Option<usize>,
}

/// Arguments for full-path simulation (plotting)
#[derive(Args)]
pub struct PathsArgs {
    /// Path to a JSON or CSV price file (Date/Close columns)
    #[arg(long)]
    pub input: Option<String>,

    /// Full SimulationInput JSON file; overrides the other flags
    #[arg(long)]
    pub config: Option<String>,

    /// Starting price (default: last observed close)
    #[arg(long)]
    pub start_price: Option<f64>,

    /// Path length in steps
    #[arg(long, default_value_t = 365)]
    pub days: usize,

    /// Number of independent paths
    #[arg(long, default_value_t = 100)]
    pub num_simulations: usize,

    /// Price model: gbm, jump-diffusion, mean-reversion, bootstrap
    #[arg(long, default_value = "gbm")]
    pub model: String,

    /// Base seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

fn build_input(
    config_path: &Option<String>,
    input_path: &Option<String>,
    start_price: Option<f64>,
    days: usize,
    num_simulations: usize,
    model: &str,
    seed: Option<u64>,
    bins: Option<usize>,
) -> Result<SimulationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = config_path {
        return input::file::read_json(path);
    }

    let prices = input::load_price_series(input_path)?;
    let start_price = resolve_start_price(start_price, &prices)?;
    Ok(SimulationInput {
        prices,
        config: SimulationConfig {
            start_price,
            days,
            num_simulations,
            model: parse_model(model)?,
            seed,
        },
        bins,
    })
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input = build_input(
        &args.config,
        &args.input,
        args.start_price,
        args.days,
        args.num_simulations,
        &args.model,
        args.seed,
        args.bins,
    )?;
    let result = run_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_paths(args: PathsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input = build_input(
        &args.config,
        &args.input,
        args.start_price,
        args.days,
        args.num_simulations,
        &args.model,
        args.seed,
        None,
    )?;
    let result = run_full_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}
