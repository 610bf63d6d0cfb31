//! Snapshot-Analysis Strategies
//!
//! Strategies that read the full multi-timeframe snapshot (bars, order book,
//! volatility) and emit bracketed signals with a confidence. All of them stay
//! silent outside the trading session.

use crate::domain::market::{MarketSnapshot, TimeFrame};
use crate::domain::session::MarketSession;
use crate::domain::signal::{TradeDirection, TradeSignal};

use super::base::{delegate_state, entry_price, Strategy, StrategyError, StrategyState};

/// Fixed ATR stand-in used for breakout brackets
pub const BREAKOUT_ATR: f64 = 20.0;

/// Minimum M5 volume for breakout confirmation
pub const BREAKOUT_MIN_VOLUME: u64 = 1500;

/// Multi-timeframe breakout with volume and volatility filters
#[derive(Debug, Clone)]
pub struct ProfessionalBreakoutStrategy {
    state: StrategyState,
    session: MarketSession,
}

impl ProfessionalBreakoutStrategy {
    pub const NAME: &'static str = "ProfessionalBreakoutStrategy";

    pub fn new(session: MarketSession) -> Self {
        Self { state: StrategyState::new(), session }
    }

    fn is_bullish(snapshot: &MarketSnapshot, timeframe: TimeFrame) -> bool {
        snapshot.bar(timeframe).is_some_and(|bar| bar.is_green())
    }

    fn has_volume_confirmation(snapshot: &MarketSnapshot) -> bool {
        snapshot
            .bar(TimeFrame::M5)
            .is_some_and(|bar| bar.volume > BREAKOUT_MIN_VOLUME)
    }
}

impl Strategy for ProfessionalBreakoutStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled || !self.session.is_open(snapshot.timestamp) {
            return Ok(None);
        }

        let m5_bullish = Self::is_bullish(snapshot, TimeFrame::M5);
        let m15_bullish = Self::is_bullish(snapshot, TimeFrame::M15);
        let volume_confirmed = Self::has_volume_confirmation(snapshot);
        let rank = snapshot.volatility.rank;
        let volatility_ok = rank > 0.3 && rank < 0.8;

        if !(volume_confirmed && volatility_ok) {
            return Ok(None);
        }

        let direction = match (m5_bullish, m15_bullish) {
            (true, true) => TradeDirection::Long,
            (false, false) => TradeDirection::Short,
            _ => return Ok(None),
        };

        let price = entry_price(snapshot)?;
        let (stop, target) = match direction {
            TradeDirection::Long => (price - BREAKOUT_ATR * 1.5, price + BREAKOUT_ATR * 3.0),
            TradeDirection::Short => (price + BREAKOUT_ATR * 1.5, price - BREAKOUT_ATR * 3.0),
        };

        let signal = TradeSignal::bracketed(
            Self::NAME,
            &snapshot.symbol,
            direction,
            price,
            stop,
            target,
            0.75,
            0.01,
        );
        Ok(self.state.emit(signal))
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("volumeThreshold", 1.5);
        self.state.set_param("atrMultiplier", 2.0);
        self.state.set_param("confidenceThreshold", 0.7);
    }

    delegate_state!();
}

/// Trend following on volatility rank and bid-side book pressure
#[derive(Debug, Clone)]
pub struct AdvancedTrendStrategy {
    state: StrategyState,
    session: MarketSession,
}

impl AdvancedTrendStrategy {
    pub const NAME: &'static str = "AdvancedTrendStrategy";

    pub fn new(session: MarketSession) -> Self {
        Self { state: StrategyState::new(), session }
    }
}

impl Strategy for AdvancedTrendStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled || !self.session.is_open(snapshot.timestamp) {
            return Ok(None);
        }

        if snapshot.volatility.rank > 0.6 && snapshot.order_book.imbalance() > 0.3 {
            let price = entry_price(snapshot)?;
            let signal = TradeSignal::bracketed(
                Self::NAME,
                &snapshot.symbol,
                TradeDirection::Long,
                price,
                price - 18.0,
                price + 36.0,
                0.7,
                0.012,
            );
            return Ok(self.state.emit(signal));
        }

        Ok(None)
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("adxThreshold", 25.0);
        self.state.set_param("trendStrength", "moderate");
    }

    delegate_state!();
}

/// Fades high-volatility regimes
#[derive(Debug, Clone)]
pub struct VolatilityStrategy {
    state: StrategyState,
    session: MarketSession,
}

impl VolatilityStrategy {
    pub const NAME: &'static str = "VolatilityStrategy";

    pub fn new(session: MarketSession) -> Self {
        Self { state: StrategyState::new(), session }
    }
}

impl Strategy for VolatilityStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled || !self.session.is_open(snapshot.timestamp) {
            return Ok(None);
        }

        let vol = &snapshot.volatility;
        if vol.high_regime && vol.rank > 0.7 {
            let price = entry_price(snapshot)?;
            let signal = TradeSignal::bracketed(
                Self::NAME,
                &snapshot.symbol,
                TradeDirection::Short,
                price,
                price + 12.0,
                price - 30.0,
                0.65,
                0.008,
            );
            return Ok(self.state.emit(signal));
        }

        Ok(None)
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("volatilityThreshold", 0.8);
        self.state.set_param("regimeDetection", "advanced");
    }

    delegate_state!();
}

/// Trades wide, lopsided books in the direction of the imbalance
#[derive(Debug, Clone)]
pub struct SmartExecutionStrategy {
    state: StrategyState,
    session: MarketSession,
}

impl SmartExecutionStrategy {
    pub const NAME: &'static str = "SmartExecutionStrategy";

    pub fn new(session: MarketSession) -> Self {
        Self { state: StrategyState::new(), session }
    }
}

impl Strategy for SmartExecutionStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled || !self.session.is_open(snapshot.timestamp) {
            return Ok(None);
        }

        let book = &snapshot.order_book;
        if book.spread() > 2.0 && book.imbalance().abs() > 0.4 {
            let price = entry_price(snapshot)?;
            let direction = if book.imbalance() > 0.0 {
                TradeDirection::Long
            } else {
                TradeDirection::Short
            };

            // Bracket offsets are fixed regardless of direction
            let signal = TradeSignal::bracketed(
                Self::NAME,
                &snapshot.symbol,
                direction,
                price,
                price - 8.0,
                price + 16.0,
                0.8,
                0.005,
            );
            return Ok(self.state.emit(signal));
        }

        Ok(None)
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("executionAlgorithm", "TWAP");
        self.state.set_param("latencyOptimization", true);
    }

    delegate_state!();
}
