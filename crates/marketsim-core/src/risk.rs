use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MarketSimError;
use crate::types::{with_metadata, ComputationOutput};
use crate::MarketSimResult;

/// Bins used when no explicit histogram resolution is requested.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Tail-risk summary of an outcome distribution at a given tail probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Empirical quantile of the distribution at `alpha`.
    pub quantile: f64,
    /// `start_price - quantile`: the loss not exceeded with confidence `1 - alpha`.
    pub value_at_risk: f64,
    /// Mean of the lowest `floor(alpha * n)` outcomes.
    pub expected_shortfall: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// A single equal-width histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Descriptive statistics plus a histogram, for rendering a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub histogram: Vec<HistogramBin>,
}

/// Input for a standalone risk assessment over an existing distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskInput {
    /// Outcome distribution (e.g. final simulated prices). Order irrelevant.
    pub distribution: Vec<f64>,
    /// Reference price the loss is measured from.
    pub start_price: f64,
    /// Tail probability (0.01 for 99% confidence).
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

pub(crate) fn default_alpha() -> f64 {
    0.01
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 normalisation); 0 for fewer than
/// 2 observations.
pub(crate) fn sample_std(values: &[f64], avg: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn sorted_ascending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

// ---------------------------------------------------------------------------
// Public API: quantile / VaR / expected shortfall
// ---------------------------------------------------------------------------

/// Empirical quantile with linear interpolation over the sorted distribution
/// (inclusive method: rank `p * (n - 1)`, interpolated between neighbours).
pub fn quantile(distribution: &[f64], p: f64) -> MarketSimResult<f64> {
    if distribution.is_empty() {
        return Err(MarketSimError::EmptyDistribution(
            "Quantile requires at least one observation".into(),
        ));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(MarketSimError::InvalidConfig {
            field: "p".into(),
            reason: format!("Quantile probability must be in [0, 1], got {p}"),
        });
    }

    let sorted = sorted_ascending(distribution);
    if sorted.len() == 1 {
        return Ok(sorted[0]);
    }

    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        Ok(sorted[lower])
    } else {
        let frac = rank - lower as f64;
        Ok(sorted[lower] * (1.0 - frac) + sorted[upper] * frac)
    }
}

/// Loss relative to the starting price at the given quantile.
pub fn value_at_risk(start_price: f64, quantile_at_alpha: f64) -> f64 {
    start_price - quantile_at_alpha
}

/// Mean of the lowest `floor(alpha * n)` outcomes. When the tail rounds down
/// to zero observations, the sorted minimum is returned instead.
pub fn expected_shortfall(distribution: &[f64], alpha: f64) -> MarketSimResult<f64> {
    if distribution.is_empty() {
        return Err(MarketSimError::EmptyDistribution(
            "Expected shortfall requires at least one observation".into(),
        ));
    }
    if !(0.0..1.0).contains(&alpha) {
        return Err(MarketSimError::InvalidConfig {
            field: "alpha".into(),
            reason: format!("Tail probability must be in [0, 1), got {alpha}"),
        });
    }

    let sorted = sorted_ascending(distribution);
    let tail_len = (alpha * sorted.len() as f64).floor() as usize;
    if tail_len == 0 {
        return Ok(sorted[0]);
    }
    Ok(mean(&sorted[..tail_len]))
}

/// Full tail-risk report for a distribution.
pub fn risk_report(
    distribution: &[f64],
    start_price: f64,
    alpha: f64,
) -> MarketSimResult<RiskReport> {
    let q = quantile(distribution, alpha)?;
    let es = expected_shortfall(distribution, alpha)?;
    let avg = mean(distribution);
    Ok(RiskReport {
        quantile: q,
        value_at_risk: value_at_risk(start_price, q),
        expected_shortfall: es,
        mean: avg,
        std_dev: sample_std(distribution, avg),
    })
}

// ---------------------------------------------------------------------------
// Distribution summary
// ---------------------------------------------------------------------------

/// Descriptive statistics and an equal-width histogram over `num_bins` bins.
/// All-equal distributions collapse to a single bin.
pub fn summarize_distribution(
    distribution: &[f64],
    num_bins: usize,
) -> MarketSimResult<DistributionSummary> {
    if distribution.is_empty() {
        return Err(MarketSimError::EmptyDistribution(
            "Cannot summarize an empty distribution".into(),
        ));
    }
    if num_bins == 0 {
        return Err(MarketSimError::InvalidConfig {
            field: "num_bins".into(),
            reason: "At least one histogram bin required".into(),
        });
    }

    let sorted = sorted_ascending(distribution);
    let avg = mean(&sorted);
    Ok(DistributionSummary {
        mean: avg,
        std_dev: sample_std(&sorted, avg),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        histogram: build_histogram(&sorted, num_bins),
    })
}

fn build_histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];
    let n = sorted.len() as f64;

    if (max_val - min_val).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min_val,
            upper: max_val,
            count: sorted.len() as u32,
            frequency: 1.0,
        }];
    }

    let bin_width = (max_val - min_val) / num_bins as f64;
    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| {
            let lower = min_val + i as f64 * bin_width;
            let upper = if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            };
            HistogramBin {
                lower,
                upper,
                count: 0,
                frequency: 0.0,
            }
        })
        .collect();

    for &val in sorted {
        let mut idx = ((val - min_val) / bin_width).floor() as usize;
        if idx >= num_bins {
            idx = num_bins - 1;
        }
        bins[idx].count += 1;
    }

    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }

    bins
}

// ---------------------------------------------------------------------------
// Public API: risk assessment envelope
// ---------------------------------------------------------------------------

/// Assess tail risk of an outcome distribution.
pub fn assess_risk(input: &RiskInput) -> MarketSimResult<ComputationOutput<RiskReport>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.distribution.is_empty() {
        return Err(MarketSimError::EmptyDistribution(
            "Risk assessment requires a non-empty distribution".into(),
        ));
    }
    if !(0.0 < input.alpha && input.alpha < 1.0) {
        return Err(MarketSimError::InvalidConfig {
            field: "alpha".into(),
            reason: format!("Tail probability must be in (0, 1), got {}", input.alpha),
        });
    }

    let report = risk_report(&input.distribution, input.start_price, input.alpha)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Empirical Quantile Risk Assessment (VaR, Expected Shortfall)",
        &serde_json::json!({
            "observations": input.distribution.len(),
            "start_price": input.start_price,
            "alpha": input.alpha,
        }),
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quantile_interpolates_inclusively() {
        let dist = [5.0, 3.0, 1.0, 4.0, 2.0];
        assert_eq!(quantile(&dist, 0.5).unwrap(), 3.0);
        assert_eq!(quantile(&dist, 0.0).unwrap(), 1.0);
        assert_eq!(quantile(&dist, 1.0).unwrap(), 5.0);
        assert_eq!(quantile(&dist, 0.25).unwrap(), 2.0);
        // Between ranks: 0.1 * 4 = 0.4 => 1.4
        assert!((quantile(&dist, 0.1).unwrap() - 1.4).abs() < 1e-12);
    }

    #[test]
    fn quantile_of_single_value() {
        assert_eq!(quantile(&[7.5], 0.99).unwrap(), 7.5);
    }

    #[test]
    fn quantile_rejects_empty_and_out_of_range() {
        assert!(matches!(
            quantile(&[], 0.5),
            Err(MarketSimError::EmptyDistribution(_))
        ));
        assert!(matches!(
            quantile(&[1.0], 1.5),
            Err(MarketSimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn value_at_risk_is_loss_from_start() {
        assert_eq!(value_at_risk(100.0, 80.0), 20.0);
        assert_eq!(value_at_risk(100.0, 110.0), -10.0);
    }

    #[test]
    fn expected_shortfall_averages_the_tail() {
        let dist: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        // floor(0.05 * 100) = 5 lowest values: 1..=5
        assert_eq!(expected_shortfall(&dist, 0.05).unwrap(), 3.0);
    }

    #[test]
    fn expected_shortfall_empty_tail_falls_back_to_minimum() {
        let dist = [4.0, 2.0, 9.0];
        // floor(0.01 * 3) = 0
        assert_eq!(expected_shortfall(&dist, 0.01).unwrap(), 2.0);
    }

    #[test]
    fn risk_report_on_known_distribution() {
        let dist: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let report = risk_report(&dist, 100.0, 0.05).unwrap();
        // quantile rank 0.05 * 99 = 4.95 => between 5 and 6
        assert!((report.quantile - 5.95).abs() < 1e-9);
        assert!((report.value_at_risk - 94.05).abs() < 1e-9);
        assert_eq!(report.expected_shortfall, 3.0);
        assert_eq!(report.mean, 50.5);
    }

    #[test]
    fn summary_handles_negative_and_non_positive_values() {
        // Negative prices are valid simulation outputs and must sort cleanly.
        let summary = summarize_distribution(&[-5.0, 0.0, 5.0, 10.0], 2).unwrap();
        assert_eq!(summary.min, -5.0);
        assert_eq!(summary.max, 10.0);
        let total: u32 = summary.histogram.iter().map(|b| b.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn histogram_counts_and_frequencies_are_consistent() {
        let dist: Vec<f64> = (0..1000).map(|i| i as f64 / 10.0).collect();
        let summary = summarize_distribution(&dist, DEFAULT_HISTOGRAM_BINS).unwrap();
        assert_eq!(summary.histogram.len(), DEFAULT_HISTOGRAM_BINS);
        let total: u32 = summary.histogram.iter().map(|b| b.count).sum();
        assert_eq!(total, 1000);
        let freq: f64 = summary.histogram.iter().map(|b| b.frequency).sum();
        assert!((freq - 1.0).abs() < 1e-10);
    }

    #[test]
    fn degenerate_distribution_collapses_to_one_bin() {
        let summary = summarize_distribution(&[2.0; 50], 20).unwrap();
        assert_eq!(summary.histogram.len(), 1);
        assert_eq!(summary.histogram[0].count, 50);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn assess_risk_envelope() {
        let input = RiskInput {
            distribution: (1..=100).map(|i| i as f64).collect(),
            start_price: 100.0,
            alpha: 0.05,
        };
        let output = assess_risk(&input).unwrap();
        assert_eq!(output.metadata.precision, "ieee754_f64");
        assert!((output.result.value_at_risk - 94.05).abs() < 1e-9);
    }

    #[test]
    fn assess_risk_rejects_empty_distribution() {
        let input = RiskInput {
            distribution: vec![],
            start_price: 100.0,
            alpha: 0.01,
        };
        assert!(matches!(
            assess_risk(&input),
            Err(MarketSimError::EmptyDistribution(_))
        ));
    }

    #[test]
    fn assess_risk_rejects_degenerate_alpha() {
        for alpha in [0.0, 1.0, -0.1] {
            let input = RiskInput {
                distribution: vec![1.0, 2.0],
                start_price: 100.0,
                alpha,
            };
            assert!(matches!(
                assess_risk(&input),
                Err(MarketSimError::InvalidConfig { .. })
            ));
        }
    }
}
