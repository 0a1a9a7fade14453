use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MarketSimError;
use crate::risk::{self, DistributionSummary, DEFAULT_HISTOGRAM_BINS};
use crate::types::{with_metadata, ComputationOutput, PriceSeries};
use crate::MarketSimResult;

/// Drift and volatility estimated from a daily closing-price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnEstimate {
    /// Sample mean of simple daily returns.
    pub mu: f64,
    /// Sample standard deviation of simple daily returns.
    pub sigma: f64,
    /// Number of return observations behind the estimate.
    pub num_returns: usize,
}

/// Input for daily-return analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnAnalysisInput {
    pub prices: PriceSeries,
    /// Histogram resolution; defaults to 20 bins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<usize>,
}

/// Output of daily-return analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnAnalysisOutput {
    pub estimate: ReturnEstimate,
    pub min_return: f64,
    pub max_return: f64,
    pub summary: DistributionSummary,
}

/// Simple daily returns `(p[i] - p[i-1]) / p[i-1]` for consecutive closes.
///
/// Division artifacts from zero prices are deliberately preserved; they
/// surface as `InvalidStatistic` when the estimate is computed.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Estimate drift and volatility from a price series.
///
/// Missing and non-finite closes are filtered before differencing. Fails with
/// `InsufficientData` when fewer than 2 valid prices remain, and with
/// `InvalidStatistic` when the estimate itself is non-finite (a zero price in
/// the series, for example).
pub fn estimate_parameters(prices: &PriceSeries) -> MarketSimResult<ReturnEstimate> {
    let closes = prices.closes();
    if closes.len() < 2 {
        return Err(MarketSimError::InsufficientData(format!(
            "At least 2 valid closing prices required to compute returns, got {}",
            closes.len()
        )));
    }

    let returns = daily_returns(&closes);
    let mu = risk::mean(&returns);
    let sigma = risk::sample_std(&returns, mu);

    if !mu.is_finite() || !sigma.is_finite() {
        return Err(MarketSimError::InvalidStatistic(format!(
            "Drift/volatility estimate is not finite (mu={mu}, sigma={sigma})"
        )));
    }

    Ok(ReturnEstimate {
        mu,
        sigma,
        num_returns: returns.len(),
    })
}

/// Analyze the daily-return distribution of a price series.
pub fn analyze_returns(
    input: &ReturnAnalysisInput,
) -> MarketSimResult<ComputationOutput<ReturnAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let estimate = estimate_parameters(&input.prices)?;
    let closes = input.prices.closes();
    let returns = daily_returns(&closes);

    if estimate.num_returns < 30 {
        warnings.push(format!(
            "Only {} return observations; estimates may be unstable",
            estimate.num_returns
        ));
    }

    let bins = input.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS);
    let summary = risk::summarize_distribution(&returns, bins)?;

    let output = ReturnAnalysisOutput {
        estimate,
        min_return: summary.min,
        max_return: summary.max,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Daily Return Analysis (sample mean/std-dev of simple returns)",
        &serde_json::json!({
            "observations": closes.len(),
            "returns": estimate.num_returns,
            "bins": bins,
        }),
        warnings,
        elapsed,
        output,
    ))
}
