use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::signal::{ExecutionType, TradeSignal};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Order rejected by venue: {0}")]
    Rejected(String),
    #[error("Venue unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

/// Signal routed to the venue with its execution algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub signal: TradeSignal,
    pub execution_type: ExecutionType,
}

impl OrderRequest {
    /// Order using the execution type the signal's confidence implies
    pub fn from_signal(signal: TradeSignal) -> Self {
        let execution_type = signal.execution_type();
        Self { signal, execution_type }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Filled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub order_id: String,
    pub strategy: String,
    pub execution_type: ExecutionType,
    pub fill_price: f64,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait ExecutionPort: Send + Sync {
    async fn submit(&self, order: OrderRequest) -> Result<ExecutionReport, ExecutionError>;
}
