use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::TradeSignal;

/// Running performance figures for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: u64,
    /// Executions whose expected return was positive at entry
    pub winning_trades: u64,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub last_update: DateTime<Utc>,
}

impl PerformanceMetrics {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            win_rate: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
            last_update: now,
        }
    }

    /// Book an executed signal
    ///
    /// A bracketed signal counts as a win when `conf * rr - (1 - conf) > 0`.
    /// Price-only signals carry no edge estimate and only bump the trade count.
    pub fn record_execution(&mut self, signal: &TradeSignal, now: DateTime<Utc>) {
        self.total_trades += 1;

        if let (Some(confidence), Some(rr)) = (signal.confidence, signal.risk_reward_ratio()) {
            let expected_return = confidence * rr - (1.0 - confidence);
            if expected_return > 0.0 {
                self.winning_trades += 1;
            }
        }

        self.win_rate = if self.total_trades > 0 {
            self.winning_trades as f64 / self.total_trades as f64
        } else {
            0.0
        };
        self.last_update = now;
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::TradeDirection;
    use approx::assert_relative_eq;

    #[test]
    fn test_winning_bracketed_trade() {
        let mut metrics = PerformanceMetrics::default();
        let signal = TradeSignal::bracketed(
            "ProfessionalBreakoutStrategy", "ES", TradeDirection::Long, 4500.0, 4470.0, 4560.0, 0.75, 0.01,
        );

        metrics.record_execution(&signal, Utc::now());

        assert_eq!(metrics.total_trades, 1);
        assert_eq!(metrics.winning_trades, 1);
        assert_relative_eq!(metrics.win_rate, 1.0);
    }

    #[test]
    fn test_negative_edge_is_not_a_win() {
        let mut metrics = PerformanceMetrics::default();
        // 0.3 * 1.0 - 0.7 < 0
        let signal = TradeSignal::bracketed(
            "Weak", "ES", TradeDirection::Long, 100.0, 90.0, 110.0, 0.3, 0.01,
        );

        metrics.record_execution(&signal, Utc::now());

        assert_eq!(metrics.total_trades, 1);
        assert_eq!(metrics.winning_trades, 0);
        assert_eq!(metrics.win_rate, 0.0);
    }

    #[test]
    fn test_price_only_signals_dilute_win_rate() {
        let mut metrics = PerformanceMetrics::default();
        let bracketed = TradeSignal::bracketed(
            "SmartExecutionStrategy", "ES", TradeDirection::Long, 100.0, 92.0, 116.0, 0.8, 0.005,
        );
        let plain = TradeSignal::at_price("ADXTrendRider", "ES", TradeDirection::Long, 100.0, 0.008);

        metrics.record_execution(&bracketed, Utc::now());
        metrics.record_execution(&plain, Utc::now());

        assert_eq!(metrics.total_trades, 2);
        assert_relative_eq!(metrics.win_rate, 0.5);
    }

    #[test]
    fn test_reset() {
        let mut metrics = PerformanceMetrics::default();
        let plain = TradeSignal::at_price("ADXTrendRider", "ES", TradeDirection::Long, 100.0, 0.008);
        metrics.record_execution(&plain, Utc::now());

        let now = Utc::now();
        metrics.reset(now);
        assert_eq!(metrics, PerformanceMetrics::new(now));
    }
}
