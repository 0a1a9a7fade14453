use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single observation in a daily price series.
///
/// Only `close` is consumed by the engine; the remaining fields are carried
/// through untouched for callers that want to keep the full record together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Closing price. `None` marks a missing observation; these are filtered
    /// out before any return is computed.
    pub close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// An ordered daily price series. Chronological order is the caller's
/// responsibility; the engine treats the series as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Valid closing prices in series order, with missing and non-finite
    /// observations dropped.
    pub fn closes(&self) -> Vec<f64> {
        self.points
            .iter()
            .filter_map(|p| p.close)
            .filter(|c| c.is_finite())
            .collect()
    }

    /// The last valid closing price, if any.
    pub fn last_close(&self) -> Option<f64> {
        self.closes().last().copied()
    }

    /// Build a series from bare closing prices with synthetic dates.
    /// Intended for callers that only have a price column.
    pub fn from_closes(closes: &[f64]) -> Self {
        let epoch = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint {
                date: epoch + chrono::Duration::days(i as i64),
                close: Some(c),
                open: None,
                high: None,
                low: None,
                volume: None,
            })
            .collect();
        PriceSeries { points }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_drops_missing_and_non_finite() {
        let mut series = PriceSeries::from_closes(&[10.0, 11.0, 12.0, 13.0]);
        series.points[1].close = None;
        series.points[2].close = Some(f64::NAN);
        assert_eq!(series.closes(), vec![10.0, 13.0]);
        assert_eq!(series.last_close(), Some(13.0));
    }

    #[test]
    fn from_closes_preserves_order() {
        let series = PriceSeries::from_closes(&[3.0, 1.0, 2.0]);
        assert_eq!(series.closes(), vec![3.0, 1.0, 2.0]);
        assert!(series.points[0].date < series.points[1].date);
    }

    #[test]
    fn price_point_roundtrips_through_json() {
        let series = PriceSeries::from_closes(&[56.3]);
        let json = serde_json::to_string(&series).unwrap();
        let back: PriceSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back.closes(), vec![56.3]);
    }
}
