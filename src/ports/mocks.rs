//! Scripted port implementations for tests and dry runs

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::market::MarketSnapshot;

use super::execution::{ExecutionError, ExecutionPort, ExecutionReport, OrderRequest, OrderStatus};
use super::market_data::{MarketDataError, MarketDataPort};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Market data port that replays queued responses
///
/// Each call pops the next queued response. Once the queue is drained the
/// last snapshot handed out is repeated; with nothing ever queued the call
/// fails as unavailable.
#[derive(Debug, Default, Clone)]
pub struct ScriptedMarketData {
    calls: Arc<Mutex<Vec<String>>>,
    script: Arc<Mutex<VecDeque<Result<MarketSnapshot, MarketDataError>>>>,
    last: Arc<Mutex<Option<MarketSnapshot>>>,
}

impl ScriptedMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to queue a snapshot
    pub fn with_snapshot(self, snapshot: MarketSnapshot) -> Self {
        lock(&self.script).push_back(Ok(snapshot));
        self
    }

    /// Builder method to queue a failure
    pub fn with_error(self, error: MarketDataError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    pub fn push_snapshot(&self, snapshot: MarketSnapshot) {
        lock(&self.script).push_back(Ok(snapshot));
    }

    /// Symbols requested so far
    pub fn get_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl MarketDataPort for ScriptedMarketData {
    async fn latest_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, MarketDataError> {
        lock(&self.calls).push(symbol.to_string());

        let next = lock(&self.script).pop_front();
        match next {
            Some(Ok(snapshot)) => {
                *lock(&self.last) = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(Err(e)) => Err(e),
            None => lock(&self.last)
                .clone()
                .ok_or_else(|| MarketDataError::Unavailable("No snapshot scripted".to_string())),
        }
    }
}

/// Execution port that records every order and fills it at the entry price
#[derive(Debug, Default, Clone)]
pub struct RecordingExecution {
    orders: Arc<Mutex<Vec<OrderRequest>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingExecution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to reject every order from `strategy`
    pub fn with_rejection(self, strategy: &str) -> Self {
        lock(&self.failing).insert(strategy.to_string());
        self
    }

    /// Get all recorded orders
    pub fn get_orders(&self) -> Vec<OrderRequest> {
        lock(&self.orders).clone()
    }
}

#[async_trait]
impl ExecutionPort for RecordingExecution {
    async fn submit(&self, order: OrderRequest) -> Result<ExecutionReport, ExecutionError> {
        lock(&self.orders).push(order.clone());

        if lock(&self.failing).contains(&order.signal.strategy) {
            return Err(ExecutionError::Rejected(format!(
                "{} orders are switched off",
                order.signal.strategy
            )));
        }

        let count = lock(&self.orders).len();
        Ok(ExecutionReport {
            order_id: format!("MOCK-{}", count),
            strategy: order.signal.strategy.clone(),
            execution_type: order.execution_type,
            fill_price: order.signal.entry_price,
            status: OrderStatus::Filled,
            timestamp: Utc::now(),
        })
    }
}
