//! Market Data Holders
//!
//! Multi-timeframe snapshot of a single futures contract: OHLCV bars keyed by
//! timeframe, a top-of-book order book, cross-asset correlations and
//! volatility regime metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Bar timeframes understood by the strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeFrame {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl TimeFrame {
    /// All timeframes, shortest first
    pub const ALL: [TimeFrame; 7] = [
        TimeFrame::M1,
        TimeFrame::M5,
        TimeFrame::M15,
        TimeFrame::M30,
        TimeFrame::H1,
        TimeFrame::H4,
        TimeFrame::D1,
    ];

    /// Bar length in minutes
    pub fn minutes(&self) -> u32 {
        match self {
            TimeFrame::M1 => 1,
            TimeFrame::M5 => 5,
            TimeFrame::M15 => 15,
            TimeFrame::M30 => 30,
            TimeFrame::H1 => 60,
            TimeFrame::H4 => 240,
            TimeFrame::D1 => 1440,
        }
    }

    /// Bar length as a duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeFrame::M1 => "M1",
            TimeFrame::M5 => "M5",
            TimeFrame::M15 => "M15",
            TimeFrame::M30 => "M30",
            TimeFrame::H1 => "H1",
            TimeFrame::H4 => "H4",
            TimeFrame::D1 => "D1",
        };
        f.write_str(label)
    }
}

/// One OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
}

impl Ohlcv {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: u64, timestamp: DateTime<Utc>) -> Self {
        Self { open, high, low, close, volume, timestamp }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Wilder true range against the previous bar, or plain range without one
    pub fn true_range(&self, previous: Option<&Ohlcv>) -> f64 {
        let range = self.high - self.low;
        match previous {
            None => range,
            Some(prev) => {
                let up = (self.high - prev.close).abs();
                let down = (self.low - prev.close).abs();
                range.max(up).max(down)
            }
        }
    }

    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }
}

/// Price key that orders by total ordering of the underlying f64
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceLevel(f64);

impl Eq for PriceLevel {}

impl PartialOrd for PriceLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Order book snapshot for microstructure checks
///
/// Bids iterate best (highest) first, asks best (lowest) first. Spread and
/// top-of-book imbalance are refreshed on every insert once both sides exist.
#[derive(Debug, Clone, Default)]
pub struct OrderBookSnapshot {
    bids: BTreeMap<Reverse<PriceLevel>, u64>,
    asks: BTreeMap<PriceLevel, u64>,
    spread: f64,
    imbalance: f64,
    total_bid_volume: u64,
    total_ask_volume: u64,
}

impl OrderBookSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a bid level
    pub fn add_bid(&mut self, price: f64, volume: u64) {
        self.bids.insert(Reverse(PriceLevel(price)), volume);
        self.total_bid_volume = self.total_bid_volume.saturating_add(volume);
        self.update_metrics();
    }

    /// Insert or replace an ask level
    pub fn add_ask(&mut self, price: f64, volume: u64) {
        self.asks.insert(PriceLevel(price), volume);
        self.total_ask_volume = self.total_ask_volume.saturating_add(volume);
        self.update_metrics();
    }

    fn update_metrics(&mut self) {
        let (Some((Reverse(bid), bid_vol)), Some((ask, ask_vol))) =
            (self.bids.iter().next(), self.asks.iter().next())
        else {
            return;
        };

        self.spread = ask.0 - bid.0;

        let (bid_vol, ask_vol) = (*bid_vol as f64, *ask_vol as f64);
        let total = bid_vol + ask_vol;
        self.imbalance = if total > 0.0 {
            (bid_vol - ask_vol) / total
        } else {
            0.0
        };
    }

    pub fn best_bid(&self) -> f64 {
        self.bids.keys().next().map_or(0.0, |Reverse(level)| level.0)
    }

    pub fn best_ask(&self) -> f64 {
        self.asks.keys().next().map_or(0.0, |level| level.0)
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Top-of-book imbalance in [-1, 1]; positive means bid pressure
    pub fn imbalance(&self) -> f64 {
        self.imbalance
    }

    pub fn spread_bps(&self) -> f64 {
        let best_bid = self.best_bid();
        if best_bid > 0.0 {
            self.spread / best_bid * 10_000.0
        } else {
            0.0
        }
    }

    pub fn total_bid_volume(&self) -> u64 {
        self.total_bid_volume
    }

    pub fn total_ask_volume(&self) -> u64 {
        self.total_ask_volume
    }

    /// Bid levels, best first
    pub fn bids(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.bids.iter().map(|(Reverse(level), vol)| (level.0, *vol))
    }

    /// Ask levels, best first
    pub fn asks(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.asks.iter().map(|(level, vol)| (level.0, *vol))
    }
}

/// Volatility metrics for regime detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    pub realized: f64,
    pub implied: f64,
    pub garch: f64,
    /// Percentile rank of current volatility in [0, 1]
    pub rank: f64,
    pub high_regime: bool,
    pub skew: f64,
}

/// Multi-timeframe market data snapshot
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub bars: HashMap<TimeFrame, Ohlcv>,
    pub order_book: OrderBookSnapshot,
    pub correlations: HashMap<String, f64>,
    pub volatility: VolatilityMetrics,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            bars: HashMap::new(),
            order_book: OrderBookSnapshot::new(),
            correlations: HashMap::new(),
            volatility: VolatilityMetrics::default(),
        }
    }

    /// Builder-style bar insertion
    pub fn with_bar(mut self, timeframe: TimeFrame, bar: Ohlcv) -> Self {
        self.bars.insert(timeframe, bar);
        self
    }

    pub fn bar(&self, timeframe: TimeFrame) -> Option<&Ohlcv> {
        self.bars.get(&timeframe)
    }

    /// Close of the M1 bar, 0.0 when no M1 bar is present
    pub fn current_price(&self) -> f64 {
        self.bars.get(&TimeFrame::M1).map_or(0.0, |bar| bar.close)
    }
}
