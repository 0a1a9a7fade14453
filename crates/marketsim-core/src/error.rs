use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketSimError {
    #[error("Invalid config: {field} — {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid statistic: {0}")]
    InvalidStatistic(String),

    #[error("Empty distribution: {0}")]
    EmptyDistribution(String),

    #[error("Simulation cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MarketSimError {
    fn from(e: serde_json::Error) -> Self {
        MarketSimError::Serialization(e.to_string())
    }
}
