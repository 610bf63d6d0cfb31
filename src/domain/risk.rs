//! Risk Management
//!
//! Per-signal validation (confidence, reward/risk, capital at risk) and a
//! per-strategy daily trade cap that rolls over at the UTC date boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::signal::TradeSignal;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskViolation {
    #[error("Risk {0:.4} exceeds maximum allowed {1:.4}")]
    RiskExceeded(f64, f64),

    #[error("Confidence {0:.2} does not clear minimum {1:.2}")]
    ConfidenceTooLow(f64, f64),

    #[error("Reward/risk {0:.2} does not clear minimum {1:.2}")]
    RewardRiskTooLow(f64, f64),

    #[error("Strategy {0} reached its daily limit of {1} trades")]
    DailyTradeLimit(String, u32),

    #[error("Risk limit validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Signals must carry a confidence strictly above this
    pub min_confidence: f64,
    /// Bracketed signals must offer a reward/risk strictly above this
    pub min_risk_reward: f64,
    /// Largest fraction of equity a single bracketed trade may risk
    pub max_risk_per_trade: f64,
    /// Risk cap for price-only signals, which carry no stop
    pub max_price_only_risk: f64,
    pub max_trades_per_strategy_per_day: u32,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            min_risk_reward: 1.5,
            max_risk_per_trade: 0.02,
            max_price_only_risk: 0.01,
            max_trades_per_strategy_per_day: 3,
        }
    }
}

pub trait RiskCheck {
    fn validate_risk_amount(&self, risk: f64) -> Result<(), RiskViolation>;
    fn validate_price_only_risk(&self, risk: f64) -> Result<(), RiskViolation>;
    fn validate_confidence(&self, confidence: f64) -> Result<(), RiskViolation>;
    fn validate_risk_reward(&self, ratio: f64) -> Result<(), RiskViolation>;
}

fn check_risk_cap(risk: f64, cap: f64) -> Result<(), RiskViolation> {
    if !risk.is_finite() || risk < 0.0 {
        Err(RiskViolation::ValidationFailed(format!("Invalid risk amount {}", risk)))
    } else if risk > cap {
        Err(RiskViolation::RiskExceeded(risk, cap))
    } else {
        Ok(())
    }
}

impl RiskCheck for RiskLimits {
    fn validate_risk_amount(&self, risk: f64) -> Result<(), RiskViolation> {
        check_risk_cap(risk, self.max_risk_per_trade)
    }

    fn validate_price_only_risk(&self, risk: f64) -> Result<(), RiskViolation> {
        check_risk_cap(risk, self.max_price_only_risk)
    }

    fn validate_confidence(&self, confidence: f64) -> Result<(), RiskViolation> {
        if confidence > self.min_confidence {
            Ok(())
        } else {
            Err(RiskViolation::ConfidenceTooLow(confidence, self.min_confidence))
        }
    }

    fn validate_risk_reward(&self, ratio: f64) -> Result<(), RiskViolation> {
        if ratio > self.min_risk_reward {
            Ok(())
        } else {
            Err(RiskViolation::RewardRiskTooLow(ratio, self.min_risk_reward))
        }
    }
}

/// Gatekeeper between strategies and execution
#[derive(Debug, Clone)]
pub struct RiskManager {
    limits: RiskLimits,
    daily_counts: HashMap<String, u32>,
    trading_day: Option<NaiveDate>,
}

impl RiskManager {
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            daily_counts: HashMap::new(),
            trading_day: None,
        }
    }

    /// Whether the strategy still has trades left today
    pub fn can_trade(&self, strategy: &str) -> bool {
        self.can_trade_at(strategy, Utc::now())
    }

    pub fn can_trade_at(&self, strategy: &str, now: DateTime<Utc>) -> bool {
        self.check_daily_limit(strategy, now).is_ok()
    }

    /// Daily cap as a violation, for callers that report why
    pub fn check_daily_limit(&self, strategy: &str, now: DateTime<Utc>) -> Result<(), RiskViolation> {
        let limit = self.limits.max_trades_per_strategy_per_day;
        if self.is_stale(now) || self.trades_today(strategy) < limit {
            Ok(())
        } else {
            Err(RiskViolation::DailyTradeLimit(strategy.to_string(), limit))
        }
    }

    /// Run every signal-level check
    ///
    /// Bracketed signals are capped by `max_risk_per_trade`, price-only
    /// signals by the tighter `max_price_only_risk`.
    pub fn validate(&self, signal: &TradeSignal) -> Result<(), RiskViolation> {
        if signal.bracket.is_some() {
            self.limits.validate_risk_amount(signal.risk_amount)?;
        } else {
            self.limits.validate_price_only_risk(signal.risk_amount)?;
        }

        if let Some(confidence) = signal.confidence {
            self.limits.validate_confidence(confidence)?;
        }

        if let Some(ratio) = signal.risk_reward_ratio() {
            self.limits.validate_risk_reward(ratio)?;
        }

        Ok(())
    }

    /// Count an executed trade against its strategy's daily budget
    pub fn record_trade(&mut self, signal: &TradeSignal, now: DateTime<Utc>) {
        self.roll_day(now);
        *self.daily_counts.entry(signal.strategy.clone()).or_insert(0) += 1;
    }

    pub fn trades_today(&self, strategy: &str) -> u32 {
        self.daily_counts.get(strategy).copied().unwrap_or(0)
    }

    pub fn reset_daily(&mut self) {
        self.daily_counts.clear();
        self.trading_day = None;
        tracing::info!("Daily trade counters reset");
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.trading_day.is_some_and(|day| now.date_naive() > day)
    }

    fn roll_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if self.trading_day.is_some_and(|day| today > day) {
            tracing::debug!("Trading day rolled over to {}", today);
            self.daily_counts.clear();
        }
        if self.trading_day.map_or(true, |day| today > day) {
            self.trading_day = Some(today);
        }
    }
}

impl Default for RiskManager {
    fn default() -> Self {
        Self::new(RiskLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::TradeDirection;
    use chrono::{Duration, TimeZone};

    fn bracketed(confidence: f64, stop: f64, target: f64, risk: f64) -> TradeSignal {
        TradeSignal::bracketed("Test", "ES", TradeDirection::Long, 100.0, stop, target, confidence, risk)
    }

    #[test]
    fn test_risk_amount_validation() {
        let limits = RiskLimits::default();

        assert!(limits.validate_risk_amount(0.01).is_ok());
        assert!(limits.validate_risk_amount(0.02).is_ok());
        assert!(matches!(
            limits.validate_risk_amount(0.021),
            Err(RiskViolation::RiskExceeded(_, _))
        ));
        assert!(matches!(
            limits.validate_risk_amount(-0.01),
            Err(RiskViolation::ValidationFailed(_))
        ));
        assert!(limits.validate_risk_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let limits = RiskLimits::default();

        assert!(limits.validate_confidence(0.61).is_ok());
        assert!(limits.validate_confidence(0.6).is_err());
        assert!(limits.validate_risk_reward(1.51).is_ok());
        assert!(limits.validate_risk_reward(1.5).is_err());
    }

    #[test]
    fn test_validate_bracketed_signal() {
        let manager = RiskManager::default();

        // 2:1 reward/risk, 0.75 confidence, 1% risk
        assert!(manager.validate(&bracketed(0.75, 90.0, 120.0, 0.01)).is_ok());

        // 1:1 reward/risk
        assert!(matches!(
            manager.validate(&bracketed(0.75, 90.0, 110.0, 0.01)),
            Err(RiskViolation::RewardRiskTooLow(_, _))
        ));

        // Low confidence
        assert!(matches!(
            manager.validate(&bracketed(0.55, 90.0, 120.0, 0.01)),
            Err(RiskViolation::ConfidenceTooLow(_, _))
        ));
    }

    #[test]
    fn test_validate_price_only_signal() {
        let manager = RiskManager::default();

        let ok = TradeSignal::at_price("15mBreakout", "ES", TradeDirection::Long, 5005.0, 0.007);
        assert!(manager.validate(&ok).is_ok());

        let too_risky = TradeSignal::at_price("Yolo", "ES", TradeDirection::Long, 5005.0, 0.05);
        assert!(manager.validate(&too_risky).is_err());

        // 1% is the ceiling without a bracket
        let at_cap = TradeSignal::at_price("QuantNewsEventReaction", "ES", TradeDirection::Long, 5005.0, 0.01);
        assert!(manager.validate(&at_cap).is_ok());

        // 1.2% passes the bracketed cap but not the price-only one
        let overlay = TradeSignal::at_price("ScheduledEventVolatilityOverlay", "ES", TradeDirection::Long, 5005.0, 0.012);
        assert!(matches!(
            manager.validate(&overlay),
            Err(RiskViolation::RiskExceeded(_, cap)) if cap == 0.01
        ));
        assert!(manager.validate(&bracketed(0.75, 90.0, 120.0, 0.012)).is_ok());
    }

    #[test]
    fn test_daily_trade_cap() {
        let mut manager = RiskManager::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap();
        let signal = bracketed(0.75, 90.0, 120.0, 0.01);

        for _ in 0..3 {
            assert!(manager.can_trade_at("Test", now));
            manager.record_trade(&signal, now);
        }

        assert!(!manager.can_trade_at("Test", now));
        assert_eq!(
            manager.check_daily_limit("Test", now),
            Err(RiskViolation::DailyTradeLimit("Test".to_string(), 3))
        );
        assert!(manager.can_trade_at("Other", now));
        assert_eq!(manager.trades_today("Test"), 3);
    }

    #[test]
    fn test_day_rollover_resets_counts() {
        let mut manager = RiskManager::default();
        let day_one = Utc.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap();
        let day_two = day_one + Duration::hours(6);
        let signal = bracketed(0.75, 90.0, 120.0, 0.01);

        for _ in 0..3 {
            manager.record_trade(&signal, day_one);
        }
        assert!(!manager.can_trade_at("Test", day_one));
        assert!(manager.can_trade_at("Test", day_two));

        manager.record_trade(&signal, day_two);
        assert_eq!(manager.trades_today("Test"), 1);
    }

    #[test]
    fn test_manual_reset() {
        let mut manager = RiskManager::default();
        let now = Utc::now();
        let signal = bracketed(0.75, 90.0, 120.0, 0.01);

        manager.record_trade(&signal, now);
        manager.reset_daily();
        assert_eq!(manager.trades_today("Test"), 0);
    }
}
