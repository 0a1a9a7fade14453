use clap::Args;
use serde_json::Value;

use marketsim_core::returns::{analyze_returns, ReturnAnalysisInput};

use crate::input;

/// Arguments for daily-return analysis
#[derive(Args)]
pub struct ReturnsArgs {
    /// Path to a JSON or CSV price file (Date/Close columns)
    #[arg(long)]
    pub input: Option<String>,

    /// Histogram bins for the return distribution
    #[arg(long)]
    pub bins: Option<usize>,
}

pub fn run_returns(args: ReturnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = input::load_price_series(&args.input)?;
    let analysis_input = ReturnAnalysisInput {
        prices,
        bins: args.bins,
    };
    let result = analyze_returns(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}
