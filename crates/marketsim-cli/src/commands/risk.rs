use clap::Args;
use serde_json::Value;

use marketsim_core::risk::{assess_risk, RiskInput};
use marketsim_core::simulation::{run_simulation, SimulationConfig, SimulationInput};

use crate::commands::{parse_model, resolve_alpha, resolve_start_price};
use crate::input;

/// Arguments for a tail-risk report
#[derive(Args)]
pub struct RiskArgs {
    /// Path to a JSON or CSV price file (Date/Close columns)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON file with an existing outcome distribution (array of final
    /// prices); skips the simulation and requires --start-price
    #[arg(long)]
    pub distribution: Option<String>,

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

    /// Tail probability (0.01 for 99% confidence)
    #[arg(long, default_value_t = 0.01)]
    pub alpha: f64,

    /// Confidence level; overrides --alpha (0.99 means alpha = 0.01)
    #[arg(long)]
    pub confidence: Option<f64>,
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let alpha = resolve_alpha(args.alpha, args.confidence);

    if let Some(ref path) = args.distribution {
        let distribution: Vec<f64> = input::file::read_json(path)?;
        let start_price = args
            .start_price
            .ok_or("--start-price is required with --distribution")?;
        let result = assess_risk(&RiskInput {
            distribution,
            start_price,
            alpha,
        })?;
        return Ok(serde_json::to_value(result)?);
    }

    let prices = input::load_price_series(&args.input)?;
    let start_price = resolve_start_price(args.start_price, &prices)?;
    let sim_output = run_simulation(&SimulationInput {
        prices,
        config: SimulationConfig {
            start_price,
            days: args.days,
            num_simulations: args.num_simulations,
            model: parse_model(&args.model)?,
            seed: args.seed,
        },
        bins: None,
    })?;

    let result = assess_risk(&RiskInput {
        distribution: sim_output.result.final_prices,
        start_price,
        alpha,
    })?;
    Ok(serde_json::to_value(result)?)
}
