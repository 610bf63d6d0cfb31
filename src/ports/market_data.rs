use async_trait::async_trait;
use thiserror::Error;

use crate::domain::market::MarketSnapshot;

/// Market data error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Market data port trait
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Latest multi-timeframe snapshot for `symbol`
    async fn latest_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, MarketDataError>;
}
