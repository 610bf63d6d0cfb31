//! Strategy Contract
//!
//! Every strategy evaluates a market snapshot and may emit one trade signal.
//! `StrategyState` carries the bookkeeping every implementation shares.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::domain::market::{MarketSnapshot, TimeFrame};
use crate::domain::signal::TradeSignal;

/// Strategy evaluation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Missing market data: {0}")]
    MissingData(String),

    #[error("Invalid market data: {0}")]
    InvalidData(String),
}

/// M1 close of the snapshot, the price every strategy trades at
pub(crate) fn entry_price(snapshot: &MarketSnapshot) -> Result<f64, StrategyError> {
    let bar = snapshot.bar(TimeFrame::M1).ok_or_else(|| {
        StrategyError::MissingData(format!("{} snapshot has no M1 bar", snapshot.symbol))
    })?;

    if bar.close > 0.0 && bar.close.is_finite() {
        Ok(bar.close)
    } else {
        Err(StrategyError::InvalidData(format!(
            "{} M1 close is not a usable price: {}",
            snapshot.symbol, bar.close
        )))
    }
}

/// Strategy parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Per-strategy counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    pub signals_generated: u64,
    pub last_reset: DateTime<Utc>,
}

/// Trait for trading strategies driven by the engine
pub trait Strategy: Send + Sync {
    /// Stable strategy name used for registration, logging and risk caps
    fn name(&self) -> &str;

    /// Evaluate the snapshot and optionally emit a signal
    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError>;

    /// Load default parameters and clear counters
    fn initialize(&mut self);

    /// Clear counters
    fn reset(&mut self);

    fn parameters(&self) -> BTreeMap<String, ParamValue>;

    fn metrics(&self) -> StrategyMetrics;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);
}

/// Shared strategy bookkeeping
#[derive(Debug, Clone)]
pub struct StrategyState {
    pub enabled: bool,
    pub parameters: BTreeMap<String, ParamValue>,
    signals_generated: u64,
    last_reset: DateTime<Utc>,
}

impl StrategyState {
    pub fn new() -> Self {
        Self {
            enabled: true,
            parameters: BTreeMap::new(),
            signals_generated: 0,
            last_reset: Utc::now(),
        }
    }

    pub fn reset(&mut self) {
        self.signals_generated = 0;
        self.last_reset = Utc::now();
    }

    pub fn set_param(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.parameters.insert(key.to_string(), value.into());
    }

    /// Count an emitted signal and pass it through
    pub fn emit(&mut self, signal: TradeSignal) -> Option<TradeSignal> {
        self.signals_generated += 1;
        Some(signal)
    }

    pub fn signals_generated(&self) -> u64 {
        self.signals_generated
    }

    pub fn metrics(&self) -> StrategyMetrics {
        StrategyMetrics {
            signals_generated: self.signals_generated,
            last_reset: self.last_reset,
        }
    }
}

impl Default for StrategyState {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements the bookkeeping half of [`Strategy`] by delegating to a
/// `state: StrategyState` field.
macro_rules! delegate_state {
    () => {
        fn reset(&mut self) {
            self.state.reset();
        }

        fn parameters(&self) -> std::collections::BTreeMap<String, $crate::strategy::base::ParamValue> {
            self.state.parameters.clone()
        }

        fn metrics(&self) -> $crate::strategy::base::StrategyMetrics {
            self.state.metrics()
        }

        fn is_enabled(&self) -> bool {
            self.state.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.state.enabled = enabled;
        }
    };
}

pub(crate) use delegate_state;
