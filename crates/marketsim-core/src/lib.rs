//! Stochastic price-path simulation and risk statistics.
//!
//! The engine consumes a daily closing-price series, estimates drift and
//! volatility from its simple returns, simulates price paths under one of
//! four stochastic models (GBM, jump-diffusion, mean-reversion, historical
//! bootstrap), and reports empirical quantile / Value-at-Risk / Expected-
//! Shortfall statistics, optionally across named stress scenarios. All
//! outputs are plain numeric data for an external rendering layer.

pub mod error;
pub mod random;
pub mod returns;
pub mod risk;
pub mod simulation;
pub mod stress;
pub mod types;

pub use error::MarketSimError;
pub use types::*;

/// Standard result type for all marketsim operations
pub type MarketSimResult<T> = Result<T, MarketSimError>;
