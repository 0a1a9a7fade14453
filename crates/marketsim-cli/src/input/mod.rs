pub mod file;
pub mod stdin;

use marketsim_core::PriceSeries;
use serde_json::Value;

/// Load a price series from `--input` (JSON or CSV by extension) or, failing
/// that, from JSON piped via stdin.
pub fn load_price_series(
    input_path: &Option<String>,
) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    if let Some(ref path) = input_path {
        if path.to_lowercase().ends_with(".csv") {
            file::read_price_csv(path)
        } else {
            let value = file::read_json_value(path)?;
            parse_series_value(value)
        }
    } else if let Some(value) = stdin::read_stdin()? {
        parse_series_value(value)
    } else {
        Err("Provide --input <file.json|file.csv> or pipe JSON via stdin".into())
    }
}

/// Accept either a full `{"points": [...]}` series or a bare array of
/// closing prices.
fn parse_series_value(value: Value) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    if let Some(arr) = value.as_array() {
        let closes: Vec<f64> = arr
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| format!("Expected a number in the price array, got {v}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PriceSeries::from_closes(&closes))
    } else if value.get("points").is_some() {
        let series: PriceSeries = serde_json::from_value(value)?;
        Ok(series)
    } else {
        Err("Expected a JSON array of closes or an object with a 'points' array".into())
    }
}
