pub mod returns;
pub mod risk;
pub mod simulate;
pub mod stress;

use marketsim_core::simulation::PriceModel;
use marketsim_core::PriceSeries;

/// Parse a model name into a `PriceModel` with its default parameters.
/// Model-specific parameters beyond the defaults are supplied via a JSON
/// config file instead of flags.
pub fn parse_model(name: &str) -> Result<PriceModel, Box<dyn std::error::Error>> {
    match name.to_lowercase().replace('_', "-").as_str() {
        "gbm" => Ok(PriceModel::Gbm),
        "jump-diffusion" => Ok(PriceModel::jump_diffusion()),
        "mean-reversion" => Ok(PriceModel::mean_reversion()),
        "bootstrap" => Ok(PriceModel::Bootstrap),
        _ => Err(format!(
            "Unknown model '{}'. Use: gbm, jump-diffusion, mean-reversion, bootstrap",
            name
        )
        .into()),
    }
}

/// Use the explicit start price when given, otherwise default to the last
/// observed close.
pub fn resolve_start_price(
    explicit: Option<f64>,
    series: &PriceSeries,
) -> Result<f64, Box<dyn std::error::Error>> {
    explicit
        .or_else(|| series.last_close())
        .ok_or_else(|| "No --start-price given and the series has no valid close".into())
}

/// Tail probability from either --alpha or --confidence (confidence wins).
pub fn resolve_alpha(alpha: f64, confidence: Option<f64>) -> f64 {
    confidence.map(|c| 1.0 - c).unwrap_or(alpha)
}
