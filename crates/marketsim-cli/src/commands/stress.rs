use clap::Args;
use serde_json::Value;

use marketsim_core::simulation::SimulationConfig;
use marketsim_core::stress::{default_scenarios, run_stress_test, StressScenario, StressTestInput};

use crate::commands::{parse_model, resolve_alpha, resolve_start_price};
use crate::input;

/// Arguments for a stress-scenario comparison
#[derive(Args)]
pub struct StressArgs {
    /// Path to a JSON or CSV price file (Date/Close columns)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON file with scenarios: [{"label", "drift_shock", "volatility_shock"}];
    /// defaults to the Financial Crisis / Tech Bubble Burst shocks
    #[arg(long)]
    pub scenarios: Option<String>,

    /// Starting price (default: last observed close)
    #[arg(long)]
    pub start_price: Option<f64>,

    /// Path length in steps
    #[arg(long, default_value_t = 365)]
    pub days: usize,

    /// Number of independent paths per scenario
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

pub fn run_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = input::load_price_series(&args.input)?;
    let start_price = resolve_start_price(args.start_price, &prices)?;

    let scenarios: Vec<StressScenario> = match args.scenarios {
        Some(ref path) => input::file::read_json(path)?,
        None => default_scenarios(),
    };

    let stress_input = StressTestInput {
        prices,
        config: SimulationConfig {
            start_price,
            days: args.days,
            num_simulations: args.num_simulations,
            model: parse_model(&args.model)?,
            seed: args.seed,
        },
        scenarios,
        alpha: resolve_alpha(args.alpha, args.confidence),
    };

    let result = run_stress_test(&stress_input)?;
    Ok(serde_json::to_value(result)?)
}
