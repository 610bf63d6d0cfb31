use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeDirection {
    Long,
    Short,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Long => write!(f, "LONG"),
            TradeDirection::Short => write!(f, "SHORT"),
        }
    }
}

/// Protective stop and profit target attached to a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// How a validated signal should be worked in the market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionType {
    Market,
    Limit,
    Twap,
}

impl ExecutionType {
    /// Pick an execution style from signal confidence
    pub fn for_confidence(confidence: Option<f64>) -> Self {
        match confidence {
            None => ExecutionType::Market,
            Some(c) if c > 0.8 => ExecutionType::Market,
            Some(c) if c > 0.7 => ExecutionType::Limit,
            Some(_) => ExecutionType::Twap,
        }
    }
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionType::Market => write!(f, "MARKET"),
            ExecutionType::Limit => write!(f, "LIMIT"),
            ExecutionType::Twap => write!(f, "TWAP"),
        }
    }
}

/// A trade idea emitted by a strategy
///
/// Snapshot-analysis strategies emit bracketed signals with a confidence.
/// Predicate strategies emit price-only signals carrying just the entry and
/// the fraction of capital at risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub strategy: String,
    pub symbol: String,
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub bracket: Option<Bracket>,
    pub confidence: Option<f64>,
    /// Fraction of account equity at risk (0.01 = 1%)
    pub risk_amount: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
}

impl TradeSignal {
    /// Signal with stop, target and confidence
    #[allow(clippy::too_many_arguments)]
    pub fn bracketed(
        strategy: impl Into<String>,
        symbol: impl Into<String>,
        direction: TradeDirection,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        confidence: f64,
        risk_amount: f64,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            symbol: symbol.into(),
            direction,
            entry_price,
            bracket: Some(Bracket { stop_loss, take_profit }),
            confidence: Some(confidence),
            risk_amount,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Entry-only signal
    pub fn at_price(
        strategy: impl Into<String>,
        symbol: impl Into<String>,
        direction: TradeDirection,
        entry_price: f64,
        risk_amount: f64,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            symbol: symbol.into(),
            direction,
            entry_price,
            bracket: None,
            confidence: None,
            risk_amount,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Reward over risk; 0.0 when the stop sits on the entry, None without a bracket
    pub fn risk_reward_ratio(&self) -> Option<f64> {
        self.bracket.map(|b| {
            let risk = (self.entry_price - b.stop_loss).abs();
            let reward = (b.take_profit - self.entry_price).abs();
            if risk > 0.0 {
                reward / risk
            } else {
                0.0
            }
        })
    }

    pub fn execution_type(&self) -> ExecutionType {
        ExecutionType::for_confidence(self.confidence)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.bracket, self.confidence) {
            (Some(b), Some(conf)) => write!(
                f,
                "TradeSignal[{}: {} {} @ {:.2}, SL: {:.2}, TP: {:.2}, RR: {:.2}, Conf: {:.2}]",
                self.strategy,
                self.direction,
                self.symbol,
                self.entry_price,
                b.stop_loss,
                b.take_profit,
                self.risk_reward_ratio().unwrap_or(0.0),
                conf
            ),
            _ => write!(
                f,
                "[Strategy={}, Price={:.2}, Risk={:.4}]",
                self.strategy, self.entry_price, self.risk_amount
            ),
        }
    }
}
