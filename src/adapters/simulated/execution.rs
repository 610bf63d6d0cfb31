use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::ports::execution::{ExecutionError, ExecutionPort, ExecutionReport, OrderRequest, OrderStatus};

use super::lock;

/// Paper venue: logs each order and fills it at the signal's entry price
#[derive(Debug, Default, Clone)]
pub struct PaperExecution {
    next_id: Arc<AtomicU64>,
    fills: Arc<Mutex<Vec<ExecutionReport>>>,
}

impl PaperExecution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills so far, oldest first
    pub fn fills(&self) -> Vec<ExecutionReport> {
        lock(&self.fills).clone()
    }
}

#[async_trait]
impl ExecutionPort for PaperExecution {
    async fn submit(&self, order: OrderRequest) -> Result<ExecutionReport, ExecutionError> {
        let signal = &order.signal;
        if !signal.entry_price.is_finite() || signal.entry_price <= 0.0 {
            return Err(ExecutionError::InvalidOrder(format!(
                "entry price {} is not tradable",
                signal.entry_price
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!("PAPER {} {} via {}", order.execution_type, signal, signal.symbol);

        let report = ExecutionReport {
            order_id: format!("PAPER-{:06}", id),
            strategy: signal.strategy.clone(),
            execution_type: order.execution_type,
            fill_price: signal.entry_price,
            status: OrderStatus::Filled,
            timestamp: Utc::now(),
        };
        lock(&self.fills).push(report.clone());
        Ok(report)
    }
}
