use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Stochastic model driving a single price path.
///
/// The jump and reversion constants default to the values observed in
/// production use; their calibration is undocumented, so they stay
/// configurable rather than hardcoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PriceModel {
    /// Geometric Brownian motion: multiplicative log-normal steps.
    Gbm,
    /// GBM plus a rare additive jump inside the exponent.
    JumpDiffusion {
        /// Per-step jump probability.
        #[serde(default = "default_lambda")]
        lambda: f64,
        #[serde(default = "default_jump_mean")]
        jump_mean: f64,
        #[serde(default = "default_jump_std_dev")]
        jump_std_dev: f64,
    },
    /// Additive mean-reverting dynamics. Numerically distinct from GBM:
    /// steps are linear in the shock, not exponential.
    MeanReversion {
        #[serde(default = "default_reversion_speed")]
        reversion_speed: f64,
        /// Level the path reverts towards; defaults to the start price.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mean_price: Option<f64>,
    },
    /// Resamples historical daily returns with replacement; ignores the
    /// estimated drift and volatility.
    Bootstrap,
}

fn default_lambda() -> f64 {
    0.01
}

fn default_jump_mean() -> f64 {
    0.01
}

fn default_jump_std_dev() -> f64 {
    0.02
}

fn default_reversion_speed() -> f64 {
    0.1
}

impl PriceModel {
    /// Jump diffusion with the default observed constants.
    pub fn jump_diffusion() -> Self {
        PriceModel::JumpDiffusion {
            lambda: default_lambda(),
            jump_mean: default_jump_mean(),
            jump_std_dev: default_jump_std_dev(),
        }
    }

    /// Mean reversion with the default observed constants.
    pub fn mean_reversion() -> Self {
        PriceModel::MeanReversion {
            reversion_speed: default_reversion_speed(),
            mean_price: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PriceModel::Gbm => "gbm",
            PriceModel::JumpDiffusion { .. } => "jump_diffusion",
            PriceModel::MeanReversion { .. } => "mean_reversion",
            PriceModel::Bootstrap => "bootstrap",
        }
    }

    /// Whether the model resamples the historical return series instead of
    /// consuming the drift/volatility estimate.
    pub fn needs_historical_returns(&self) -> bool {
        matches!(self, PriceModel::Bootstrap)
    }
}

impl Default for PriceModel {
    fn default() -> Self {
        PriceModel::Gbm
    }
}

/// Simulate one price path of `days` steps.
///
/// `path[0] == start_price`; the loop runs for `i` in `[1, days)` with
/// `dt = 1/days`. Negative prices are valid outputs and are never clamped.
/// Deterministic given a deterministic `source`. `historical_returns` is only
/// consumed by the bootstrap model and must be non-empty for it (the engine
/// validates this before any draw).
pub fn simulate_path(
    start_price: f64,
    days: usize,
    mu: f64,
    sigma: f64,
    model: &PriceModel,
    historical_returns: &[f64],
    source: &mut impl RandomSource,
) -> Vec<f64> {
    let dt = 1.0 / days as f64;
    let sqrt_dt = dt.sqrt();

    let mut path = Vec::with_capacity(days);
    path.push(start_price);

    for _ in 1..days {
        let prev = path[path.len() - 1];
        let next = match model {
            PriceModel::Gbm => {
                let drift = (mu - 0.5 * sigma * sigma) * dt;
                let shock = source.next_normal(0.0, sigma * sqrt_dt);
                prev * (drift + shock).exp()
            }
            PriceModel::JumpDiffusion {
                lambda,
                jump_mean,
                jump_std_dev,
            } => {
                let drift = (mu - 0.5 * sigma * sigma) * dt;
                let shock = source.next_normal(0.0, sigma * sqrt_dt);
                let jump = if source.next_uniform() < *lambda {
                    source.next_normal(*jump_mean, *jump_std_dev)
                } else {
                    0.0
                };
                prev * (drift + shock + jump).exp()
            }
            PriceModel::MeanReversion {
                reversion_speed,
                mean_price,
            } => {
                let level = mean_price.unwrap_or(start_price);
                let drift = reversion_speed * (level - prev) * dt;
                let shock = source.next_normal(0.0, sigma * sqrt_dt);
                prev + prev * (drift + shock)
            }
            PriceModel::Bootstrap => {
                let n = historical_returns.len();
                let idx = ((source.next_uniform() * n as f64) as usize).min(n - 1);
                prev * (1.0 + historical_returns[idx])
            }
        };
        path.push(next);
    }

    path
}
