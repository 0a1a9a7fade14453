use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::MarketSimError;
use crate::random::PrngSource;
use crate::returns::{self, ReturnEstimate};
use crate::risk::{self, DistributionSummary, DEFAULT_HISTOGRAM_BINS};
use crate::simulation::path::{simulate_path, PriceModel};
use crate::types::{with_metadata, ComputationOutput, PriceSeries};
use crate::MarketSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parameters of one Monte Carlo run. Immutable for the duration of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Starting price of every path.
    pub start_price: f64,
    /// Path length in steps; `dt = 1/days`.
    #[serde(default = "default_days")]
    pub days: usize,
    /// Number of independent paths.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    #[serde(default)]
    pub model: PriceModel,
    /// Base seed; run `i` draws from `seed + i`. `None` seeds from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_days() -> usize {
    365
}

fn default_num_simulations() -> usize {
    10_000
}

/// Top-level input: a price series to estimate from plus the run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub prices: PriceSeries,
    pub config: SimulationConfig,
    /// Histogram resolution for the final-price summary; defaults to 20 bins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<usize>,
}

/// Final-price distribution across all runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub estimate: ReturnEstimate,
    pub final_prices: Vec<f64>,
    pub summary: DistributionSummary,
}

/// Every full path, for plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsOutput {
    pub estimate: ReturnEstimate,
    pub paths: Vec<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_config(config: &SimulationConfig) -> MarketSimResult<()> {
    if !(config.start_price > 0.0 && config.start_price.is_finite()) {
        return Err(MarketSimError::InvalidConfig {
            field: "start_price".into(),
            reason: format!("Must be a positive finite number, got {}", config.start_price),
        });
    }
    if config.days < 1 {
        return Err(MarketSimError::InvalidConfig {
            field: "days".into(),
            reason: "At least 1 step required".into(),
        });
    }
    if config.num_simulations < 1 {
        return Err(MarketSimError::InvalidConfig {
            field: "num_simulations".into(),
            reason: "At least 1 simulation required".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Fan `num_simulations` independent path simulations out over the thread
/// pool. Run `i` uses its own PRNG seeded with `base_seed + i`, so results
/// are index-ordered and reproducible regardless of scheduling. The cancel
/// flag is checked between runs; once observed, the whole run fails with
/// `Cancelled` and no partial result is returned.
fn fan_out<T, F>(
    config: &SimulationConfig,
    mu: f64,
    sigma: f64,
    historical_returns: &[f64],
    cancel: &AtomicBool,
    extract: F,
) -> MarketSimResult<Vec<T>>
where
    T: Send,
    F: Fn(Vec<f64>) -> T + Sync,
{
    validate_config(config)?;
    if !(mu.is_finite() && sigma.is_finite()) {
        return Err(MarketSimError::InvalidStatistic(format!(
            "Simulation parameters must be finite (mu={mu}, sigma={sigma})"
        )));
    }
    if config.model.needs_historical_returns() && historical_returns.is_empty() {
        return Err(MarketSimError::InsufficientData(
            "Bootstrap model requires a non-empty historical return series".into(),
        ));
    }

    let base_seed = config
        .seed
        .unwrap_or_else(|| StdRng::from_entropy().gen());

    (0..config.num_simulations)
        .into_par_iter()
        .map(|i| {
            if cancel.load(Ordering::Relaxed) {
                return Err(MarketSimError::Cancelled);
            }
            let mut source = PrngSource::from_seed(base_seed.wrapping_add(i as u64));
            let path = simulate_path(
                config.start_price,
                config.days,
                mu,
                sigma,
                &config.model,
                historical_returns,
                &mut source,
            );
            Ok(extract(path))
        })
        .collect()
}

/// Run the configured number of independent paths and collect final prices.
pub fn run(
    config: &SimulationConfig,
    mu: f64,
    sigma: f64,
    historical_returns: &[f64],
) -> MarketSimResult<Vec<f64>> {
    let cancel = AtomicBool::new(false);
    run_cancellable(config, mu, sigma, historical_returns, &cancel)
}

/// As [`run`], but observes a cooperative cancellation flag between runs.
pub fn run_cancellable(
    config: &SimulationConfig,
    mu: f64,
    sigma: f64,
    historical_returns: &[f64],
    cancel: &AtomicBool,
) -> MarketSimResult<Vec<f64>> {
    fan_out(config, mu, sigma, historical_returns, cancel, |path| {
        path[path.len() - 1]
    })
}

/// Run the configured number of independent paths and keep each full path.
pub fn run_full(
    config: &SimulationConfig,
    mu: f64,
    sigma: f64,
    historical_returns: &[f64],
) -> MarketSimResult<Vec<Vec<f64>>> {
    let cancel = AtomicBool::new(false);
    fan_out(config, mu, sigma, historical_returns, &cancel, |path| path)
}

// ---------------------------------------------------------------------------
// Public API: envelope operations
// ---------------------------------------------------------------------------

/// Estimate drift/volatility from the price series, then simulate the
/// final-price distribution. The estimate is recomputed fresh on every call;
/// nothing is cached across datasets.
pub fn run_simulation(
    input: &SimulationInput,
) -> MarketSimResult<ComputationOutput<SimulationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let estimate = returns::estimate_parameters(&input.prices)?;
    let closes = input.prices.closes();
    let historical_returns = returns::daily_returns(&closes);

    let final_prices = run(&input.config, estimate.mu, estimate.sigma, &historical_returns)?;

    if final_prices.iter().any(|p| *p <= 0.0) {
        warnings.push(
            "Some final prices are non-positive; unconstrained dynamics allow this".into(),
        );
    }

    let bins = input.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS);
    let summary = risk::summarize_distribution(&final_prices, bins)?;

    let output = SimulationOutput {
        estimate,
        final_prices,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo Final-Price Simulation",
        &serde_json::json!({
            "model": input.config.model.name(),
            "start_price": input.config.start_price,
            "days": input.config.days,
            "num_simulations": input.config.num_simulations,
            "seed": input.config.seed,
            "mu": output.estimate.mu,
            "sigma": output.estimate.sigma,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// As [`run_simulation`], but returns every full path for plotting.
pub fn run_full_simulation(
    input: &SimulationInput,
) -> MarketSimResult<ComputationOutput<PathsOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let estimate = returns::estimate_parameters(&input.prices)?;
    let closes = input.prices.closes();
    let historical_returns = returns::daily_returns(&closes);

    let paths = run_full(&input.config, estimate.mu, estimate.sigma, &historical_returns)?;

    let output = PathsOutput { estimate, paths };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo Path Simulation",
        &serde_json::json!({
            "model": input.config.model.name(),
            "start_price": input.config.start_price,
            "days": input.config.days,
            "num_simulations": input.config.num_simulations,
            "seed": input.config.seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEED: u64 = 42;

    fn gbm_config(num_simulations: usize) -> SimulationConfig {
        SimulationConfig {
            start_price: 100.0,
            days: 30,
            num_simulations,
            model: PriceModel::Gbm,
            seed: Some(SEED),
        }
    }

    fn trending_series() -> PriceSeries {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 * 1.001f64.powi(i)).collect();
        PriceSeries::from_closes(&closes)
    }

    #[test]
    fn seeded_runs_are_reproducible_and_index_ordered() {
        let config = gbm_config(200);
        let a = run(&config, 0.001, 0.02, &[]).unwrap();
        let b = run(&config, 0.001, 0.02, &[]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 200);
    }

    #[test]
    fn single_run_matches_one_path_simulation() {
        let config = gbm_config(1);
        let finals = run(&config, 0.001, 0.02, &[]).unwrap();

        let mut source = PrngSource::from_seed(SEED);
        let path = simulate_path(100.0, 30, 0.001, 0.02, &PriceModel::Gbm, &[], &mut source);
        assert_eq!(finals[0], path[path.len() - 1]);
    }

    #[test]
    fn full_paths_have_requested_shape() {
        let config = gbm_config(5);
        let paths = run_full(&config, 0.0, 0.1, &[]).unwrap();
        assert_eq!(paths.len(), 5);
        for path in &paths {
            assert_eq!(path.len(), 30);
            assert_eq!(path[0], 100.0);
        }
    }

    #[test]
    fn runs_use_independent_draws() {
        let config = gbm_config(50);
        let finals = run(&config, 0.0, 0.2, &[]).unwrap();
        let distinct = finals
            .iter()
            .filter(|&&p| (p - finals[0]).abs() > 1e-12)
            .count();
        assert!(distinct > 0, "all runs produced the same final price");
    }

    #[test]
    fn gbm_final_price_mean_converges_to_exponential_drift() {
        let config = SimulationConfig {
            start_price: 100.0,
            days: 50,
            num_simulations: 20_000,
            model: PriceModel::Gbm,
            seed: Some(SEED),
        };
        let finals = run(&config, 0.05, 0.1, &[]).unwrap();
        let mean = finals.iter().sum::<f64>() / finals.len() as f64;
        // E[S_T] = S_0 * exp(mu * T) with T = days * dt = 1.
        let expected = 100.0 * 0.05f64.exp();
        assert!((mean - expected).abs() < 0.5, "mean={mean} expected={expected}");
    }

    #[test]
    fn invalid_configs_are_rejected_before_any_work() {
        let mut config = gbm_config(10);
        config.start_price = 0.0;
        assert!(matches!(
            run(&config, 0.0, 0.1, &[]),
            Err(MarketSimError::InvalidConfig { .. })
        ));

        let mut config = gbm_config(10);
        config.start_price = -5.0;
        assert!(matches!(
            run(&config, 0.0, 0.1, &[]),
            Err(MarketSimError::InvalidConfig { .. })
        ));

        let mut config = gbm_config(10);
        config.days = 0;
        assert!(matches!(
            run(&config, 0.0, 0.1, &[]),
            Err(MarketSimError::InvalidConfig { .. })
        ));

        let config = gbm_config(0);
        assert!(matches!(
            run(&config, 0.0, 0.1, &[]),
            Err(MarketSimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn non_finite_estimates_are_rejected() {
        let config = gbm_config(10);
        assert!(matches!(
            run(&config, f64::NAN, 0.1, &[]),
            Err(MarketSimError::InvalidStatistic(_))
        ));
    }

    #[test]
    fn bootstrap_requires_historical_returns() {
        let mut config = gbm_config(10);
        config.model = PriceModel::Bootstrap;
        assert!(matches!(
            run(&config, 0.0, 0.0, &[]),
            Err(MarketSimError::InsufficientData(_))
        ));
    }

    #[test]
    fn cancellation_aborts_without_partial_results() {
        let config = gbm_config(100);
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            run_cancellable(&config, 0.0, 0.1, &[], &cancel),
            Err(MarketSimError::Cancelled)
        ));
    }

    #[test]
    fn degenerate_two_day_gbm_is_flat() {
        let input = SimulationInput {
            prices: PriceSeries::from_closes(&[100.0; 10]),
            config: SimulationConfig {
                start_price: 100.0,
                days: 2,
                num_simulations: 1,
                model: PriceModel::Gbm,
                seed: Some(SEED),
            },
            bins: None,
        };
        let output = run_full_simulation(&input).unwrap();
        assert_eq!(output.result.paths, vec![vec![100.0, 100.0]]);
    }

    #[test]
    fn simulation_envelope_is_reproducible() {
        let input = SimulationInput {
            prices: trending_series(),
            config: gbm_config(500),
            bins: None,
        };
        let a = run_simulation(&input).unwrap();
        let b = run_simulation(&input).unwrap();
        assert_eq!(a.result.final_prices, b.result.final_prices);
        assert_eq!(a.result.summary, b.result.summary);
        assert_eq!(a.metadata.precision, "ieee754_f64");
    }

    #[test]
    fn estimate_failure_aborts_before_random_draws() {
        let input = SimulationInput {
            prices: PriceSeries::from_closes(&[100.0]),
            config: gbm_config(10),
            bins: None,
        };
        assert!(matches!(
            run_simulation(&input),
            Err(MarketSimError::InsufficientData(_))
        ));
    }

    #[test]
    fn bootstrap_simulation_runs_off_the_series_returns() {
        let input = SimulationInput {
            prices: PriceSeries::from_closes(&[100.0; 10]),
            config: SimulationConfig {
                start_price: 100.0,
                days: 10,
                num_simulations: 3,
                model: PriceModel::Bootstrap,
                seed: Some(SEED),
            },
            bins: None,
        };
        // All historical returns are zero, so every path stays flat.
        let output = run_simulation(&input).unwrap();
        assert!(output.result.final_prices.iter().all(|&p| p == 100.0));
    }
}
