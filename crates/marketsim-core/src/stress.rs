use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MarketSimError;
use crate::returns;
use crate::risk::{self, default_alpha, RiskReport};
use crate::simulation::engine::{self, SimulationConfig};
use crate::types::{with_metadata, ComputationOutput, PriceSeries};
use crate::MarketSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A named shock applied to the estimated simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub label: String,
    /// Added to the estimated drift for this scenario's runs.
    pub drift_shock: f64,
    /// Added to the estimated volatility. The reference scenarios leave this
    /// at 0; it is kept as a configurable hook.
    #[serde(default)]
    pub volatility_shock: f64,
}

/// The two canonical drift-shock scenarios.
pub fn default_scenarios() -> Vec<StressScenario> {
    vec![
        StressScenario {
            label: "Financial Crisis".into(),
            drift_shock: -0.20,
            volatility_shock: 0.0,
        },
        StressScenario {
            label: "Tech Bubble Burst".into(),
            drift_shock: -0.15,
            volatility_shock: 0.0,
        },
    ]
}

/// Input for a stress comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestInput {
    pub prices: PriceSeries,
    pub config: SimulationConfig,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<StressScenario>,
    /// Tail probability for every risk report (0.01 for 99% confidence).
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

/// Risk report for a single scenario, keyed by its label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRiskReport {
    pub label: String,
    pub drift_shock: f64,
    pub volatility_shock: f64,
    pub report: RiskReport,
}

/// Baseline plus per-scenario reports, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestOutput {
    pub baseline: RiskReport,
    pub scenarios: Vec<ScenarioRiskReport>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the baseline simulation with the estimated `(mu, sigma)`, then one
/// fresh simulation per scenario with the shocked parameters, and assemble a
/// comparative report. Each scenario derives its own seed, so no run shares
/// draws with another, and the base config is never mutated.
pub fn run_stress_test(
    input: &StressTestInput,
) -> MarketSimResult<ComputationOutput<StressTestOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if !(0.0 < input.alpha && input.alpha < 1.0) {
        return Err(MarketSimError::InvalidConfig {
            field: "alpha".into(),
            reason: format!("Tail probability must be in (0, 1), got {}", input.alpha),
        });
    }
    if input.scenarios.is_empty() {
        warnings.push("No stress scenarios supplied; reporting baseline only".into());
    }

    let estimate = returns::estimate_parameters(&input.prices)?;
    let closes = input.prices.closes();
    let historical_returns = returns::daily_returns(&closes);

    let baseline_finals = engine::run(
        &input.config,
        estimate.mu,
        estimate.sigma,
        &historical_returns,
    )?;
    let baseline = risk::risk_report(&baseline_finals, input.config.start_price, input.alpha)?;

    let mut scenarios = Vec::with_capacity(input.scenarios.len());
    for (i, scenario) in input.scenarios.iter().enumerate() {
        let shocked_mu = estimate.mu + scenario.drift_shock;
        let shocked_sigma = estimate.sigma + scenario.volatility_shock;
        if shocked_sigma < 0.0 {
            warnings.push(format!(
                "Scenario '{}' shocks volatility below zero ({shocked_sigma})",
                scenario.label
            ));
        }

        // Offset well clear of the per-run indices so scenario draws never
        // overlap the baseline's.
        let mut scenario_config = input.config.clone();
        scenario_config.seed = input
            .config
            .seed
            .map(|s| s.wrapping_add(((i as u64) + 1) << 32));

        let finals = engine::run(
            &scenario_config,
            shocked_mu,
            shocked_sigma,
            &historical_returns,
        )?;
        let report = risk::risk_report(&finals, input.config.start_price, input.alpha)?;

        scenarios.push(ScenarioRiskReport {
            label: scenario.label.clone(),
            drift_shock: scenario.drift_shock,
            volatility_shock: scenario.volatility_shock,
            report,
        });
    }

    let output = StressTestOutput {
        baseline,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Stress-Scenario Monte Carlo Comparison",
        &serde_json::json!({
            "model": input.config.model.name(),
            "start_price": input.config.start_price,
            "days": input.config.days,
            "num_simulations": input.config.num_simulations,
            "alpha": input.alpha,
            "scenarios": input.scenarios.iter().map(|s| &s.label).collect::<Vec<_>>(),
            "mu": estimate.mu,
            "sigma": estimate.sigma,
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
    use crate::simulation::path::PriceModel;
    use pretty_assertions::assert_eq;

    const SEED: u64 = 42;

    fn noisy_series() -> PriceSeries {
        // Alternating moves give a small, stable volatility estimate.
        let mut closes = Vec::with_capacity(80);
        let mut price = 100.0;
        for i in 0..80 {
            price *= if i % 2 == 0 { 1.002 } else { 0.999 };
            closes.push(price);
        }
        PriceSeries::from_closes(&closes)
    }

    fn stress_input(num_simulations: usize, scenarios: Vec<StressScenario>) -> StressTestInput {
        StressTestInput {
            prices: noisy_series(),
            config: SimulationConfig {
                start_price: 100.0,
                days: 30,
                num_simulations,
                model: PriceModel::Gbm,
                seed: Some(SEED),
            },
            scenarios,
            alpha: 0.05,
        }
    }

    #[test]
    fn default_scenarios_are_the_two_reference_shocks() {
        let scenarios = default_scenarios();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].label, "Financial Crisis");
        assert_eq!(scenarios[0].drift_shock, -0.20);
        assert_eq!(scenarios[1].label, "Tech Bubble Burst");
        assert_eq!(scenarios[1].drift_shock, -0.15);
    }

    #[test]
    fn scenario_order_and_labels_are_preserved() {
        let output = run_stress_test(&stress_input(50, default_scenarios())).unwrap();
        let labels: Vec<&str> = output
            .result
            .scenarios
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Financial Crisis", "Tech Bubble Burst"]);
    }

    #[test]
    fn seeded_stress_test_is_reproducible() {
        let input = stress_input(200, default_scenarios());
        let a = run_stress_test(&input).unwrap();
        let b = run_stress_test(&input).unwrap();
        assert_eq!(a.result.baseline, b.result.baseline);
        assert_eq!(
            a.result.scenarios[0].report,
            b.result.scenarios[0].report
        );
    }

    #[test]
    fn zero_shock_scenario_matches_baseline_within_noise() {
        let input = stress_input(
            4_000,
            vec![StressScenario {
                label: "No Shock".into(),
                drift_shock: 0.0,
                volatility_shock: 0.0,
            }],
        );
        let output = run_stress_test(&input).unwrap();
        let baseline = &output.result.baseline;
        let scenario = &output.result.scenarios[0].report;
        assert!(
            (scenario.mean - baseline.mean).abs() < 0.2,
            "scenario mean {} vs baseline {}",
            scenario.mean,
            baseline.mean
        );
        assert!(
            (scenario.quantile - baseline.quantile).abs() < 0.5,
            "scenario quantile {} vs baseline {}",
            scenario.quantile,
            baseline.quantile
        );
    }

    #[test]
    fn negative_drift_shock_raises_value_at_risk() {
        let output = run_stress_test(&stress_input(2_000, default_scenarios())).unwrap();
        let baseline = &output.result.baseline;
        for scenario in &output.result.scenarios {
            assert!(
                scenario.report.mean < baseline.mean,
                "{} mean {} should sit below baseline {}",
                scenario.label,
                scenario.report.mean,
                baseline.mean
            );
            assert!(
                scenario.report.value_at_risk > baseline.value_at_risk,
                "{} VaR {} should exceed baseline {}",
                scenario.label,
                scenario.report.value_at_risk,
                baseline.value_at_risk
            );
        }
    }

    #[test]
    fn volatility_hook_widens_the_distribution() {
        let input = stress_input(
            2_000,
            vec![StressScenario {
                label: "Vol Spike".into(),
                drift_shock: 0.0,
                volatility_shock: 0.05,
            }],
        );
        let output = run_stress_test(&input).unwrap();
        assert!(
            output.result.scenarios[0].report.std_dev > output.result.baseline.std_dev,
            "shocked std_dev {} should exceed baseline {}",
            output.result.scenarios[0].report.std_dev,
            output.result.baseline.std_dev
        );
    }

    #[test]
    fn empty_scenario_list_reports_baseline_with_warning() {
        let output = run_stress_test(&stress_input(50, vec![])).unwrap();
        assert!(output.result.scenarios.is_empty());
        assert!(output.warnings.iter().any(|w| w.contains("baseline only")));
    }

    #[test]
    fn degenerate_alpha_is_rejected() {
        let mut input = stress_input(50, default_scenarios());
        input.alpha = 1.0;
        assert!(matches!(
            run_stress_test(&input),
            Err(MarketSimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn estimation_failure_aborts_the_whole_run() {
        let mut input = stress_input(50, default_scenarios());
        input.prices = PriceSeries::from_closes(&[100.0]);
        assert!(matches!(
            run_stress_test(&input),
            Err(MarketSimError::InsufficientData(_))
        ));
    }
}
