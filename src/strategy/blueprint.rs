//! Predicate Strategies
//!
//! Lightweight strategies that gate on the indicator predicates, news feed,
//! routing quotes or a rolling volatility model and emit price-only signals
//! at the current price.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use crate::domain::market::MarketSnapshot;
use crate::domain::signal::{TradeDirection, TradeSignal};
use crate::ports::news::NewsFeed;
use crate::ports::routing::RouteProvider;

use super::base::{delegate_state, entry_price, Strategy, StrategyError, StrategyState};
use super::indicators::{IndicatorProcessor, VolatilityModel};

/// Latency ceiling for routing arbitrage
pub const MAX_ROUTE_LATENCY_MS: u32 = 50;

/// Order-book imbalance treated as persistent bid pressure
pub const BOOK_PRESSURE_IMBALANCE: f64 = 0.3;

/// Entry condition for a [`PredicateStrategy`]
pub type EntryRule = fn(&IndicatorProcessor, &MarketSnapshot, f64) -> bool;

/// Long-at-market strategy defined by a single entry rule and a fixed risk
pub struct PredicateStrategy {
    name: &'static str,
    rule: EntryRule,
    risk: f64,
    indicators: IndicatorProcessor,
    state: StrategyState,
}

impl PredicateStrategy {
    pub fn new(name: &'static str, rule: EntryRule, risk: f64, indicators: IndicatorProcessor) -> Self {
        Self {
            name,
            rule,
            risk,
            indicators,
            state: StrategyState::new(),
        }
    }

    /// Trending above 5000
    pub fn fifteen_min_breakout(ip: IndicatorProcessor) -> Self {
        Self::new("15mBreakout", |ip, _, price| ip.is_trending(price) && price > 5000.0, 0.007, ip)
    }

    /// Trending and not choppy
    pub fn adx_trend_rider(ip: IndicatorProcessor) -> Self {
        Self::new("ADXTrendRider", |ip, _, price| ip.is_trending(price) && !ip.is_choppy(price), 0.008, ip)
    }

    /// Volume spike without trend
    pub fn premarket_pivot(ip: IndicatorProcessor) -> Self {
        Self::new(
            "PremarketPivot",
            |ip, _, price| !ip.is_trending(price) && ip.is_volume_spike(price),
            0.009,
            ip,
        )
    }

    pub fn liquidity_sweep_reversal(ip: IndicatorProcessor) -> Self {
        Self::new(
            "LiquiditySweepReversal",
            |ip, _, price| ip.is_liquidity_sweep(price) && ip.is_reversal_sign(price),
            0.008,
            ip,
        )
    }

    pub fn adaptive_breakout_confirmation(ip: IndicatorProcessor) -> Self {
        Self::new(
            "AdaptiveBreakoutConfirmation",
            |ip, _, price| {
                ip.is_volume_spike(price) && ip.is_trending(price) && ip.is_breakout_confirmed(price)
            },
            0.008,
            ip,
        )
    }

    pub fn swing_failure_pattern(ip: IndicatorProcessor) -> Self {
        Self::new("SwingFailurePattern", |ip, _, price| ip.is_swing_failure(price), 0.009, ip)
    }

    /// Persistent bid pressure in a non-choppy tape
    pub fn order_book_pressure_scalping(ip: IndicatorProcessor) -> Self {
        Self::new(
            "OrderBookPressureScalping",
            |ip, snapshot, price| {
                snapshot.order_book.imbalance() > BOOK_PRESSURE_IMBALANCE && !ip.is_choppy(price)
            },
            0.006,
            ip,
        )
    }
}

impl Strategy for PredicateStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled {
            return Ok(None);
        }

        let price = entry_price(snapshot)?;
        if (self.rule)(&self.indicators, snapshot, price) {
            let signal = TradeSignal::at_price(self.name, &snapshot.symbol, TradeDirection::Long, price, self.risk);
            return Ok(self.state.emit(signal));
        }

        Ok(None)
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("riskPerTrade", self.risk);
    }

    delegate_state!();
}

/// Trades high-volatility prints during major news, direction from sentiment
pub struct QuantNewsEventReactionStrategy {
    indicators: IndicatorProcessor,
    news: Arc<dyn NewsFeed>,
    state: StrategyState,
}

impl QuantNewsEventReactionStrategy {
    pub const NAME: &'static str = "QuantNewsEventReaction";

    pub fn new(indicators: IndicatorProcessor, news: Arc<dyn NewsFeed>) -> Self {
        Self { indicators, news, state: StrategyState::new() }
    }
}

impl Strategy for QuantNewsEventReactionStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled {
            return Ok(None);
        }

        let price = entry_price(snapshot)?;
        if !(self.news.is_major_event_active() && self.indicators.is_volatility_high(price)) {
            return Ok(None);
        }

        let sentiment = self.news.sentiment_score();
        let signal = if sentiment > 0.7 {
            TradeSignal::at_price(Self::NAME, &snapshot.symbol, TradeDirection::Long, price, 0.01)
        } else if sentiment < 0.3 {
            // Fade the move one percent below
            TradeSignal::at_price(Self::NAME, &snapshot.symbol, TradeDirection::Short, price * 0.99, 0.01)
        } else {
            return Ok(None);
        };

        Ok(self.state.emit(signal.with_metadata("sentiment", format!("{:.2}", sentiment))))
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("bullishSentiment", 0.7);
        self.state.set_param("bearishSentiment", 0.3);
    }

    delegate_state!();
}

/// Goes with strong positive sentiment in a trending tape
pub struct RealTimeSentimentOverlayStrategy {
    indicators: IndicatorProcessor,
    news: Arc<dyn NewsFeed>,
    state: StrategyState,
}

impl RealTimeSentimentOverlayStrategy {
    pub const NAME: &'static str = "RealTimeSentimentOverlay";

    pub fn new(indicators: IndicatorProcessor, news: Arc<dyn NewsFeed>) -> Self {
        Self { indicators, news, state: StrategyState::new() }
    }
}

impl Strategy for RealTimeSentimentOverlayStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled {
            return Ok(None);
        }

        let price = entry_price(snapshot)?;
        if self.news.sentiment_score() > 0.7 && self.indicators.is_trending(price) {
            let signal = TradeSignal::at_price(Self::NAME, &snapshot.symbol, TradeDirection::Long, price, 0.007);
            return Ok(self.state.emit(signal));
        }

        Ok(None)
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("sentimentThreshold", 0.7);
    }

    delegate_state!();
}

/// Rides scheduled releases when the volatility regime is already hot
pub struct ScheduledEventVolatilityOverlayStrategy {
    news: Arc<dyn NewsFeed>,
    state: StrategyState,
}

impl ScheduledEventVolatilityOverlayStrategy {
    pub const NAME: &'static str = "ScheduledEventVolatilityOverlay";

    pub fn new(news: Arc<dyn NewsFeed>) -> Self {
        Self { news, state: StrategyState::new() }
    }
}

impl Strategy for ScheduledEventVolatilityOverlayStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled {
            return Ok(None);
        }

        let price = entry_price(snapshot)?;
        if self.news.is_major_event_active() && snapshot.volatility.high_regime {
            let signal = TradeSignal::at_price(Self::NAME, &snapshot.symbol, TradeDirection::Long, price, 0.012);
            return Ok(self.state.emit(signal));
        }

        Ok(None)
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("riskPerTrade", 0.012);
    }

    delegate_state!();
}

/// Regime switch on rolling price dispersion
///
/// Every evaluation feeds the model, so the strategy keeps learning even
/// when it stays flat.
pub struct VolatilityClusteringRegimeSwitchStrategy {
    model: VolatilityModel,
    state: StrategyState,
}

impl VolatilityClusteringRegimeSwitchStrategy {
    pub const NAME: &'static str = "VolatilityClusteringRegimeSwitch";

    pub fn new() -> Self {
        Self { model: VolatilityModel::default(), state: StrategyState::new() }
    }

    pub fn model(&self) -> &VolatilityModel {
        &self.model
    }
}

impl Default for VolatilityClusteringRegimeSwitchStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for VolatilityClusteringRegimeSwitchStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled {
            return Ok(None);
        }

        let price = entry_price(snapshot)?;
        self.model.update(price);

        let risk = if self.model.is_high() {
            0.009
        } else if self.model.is_low() {
            0.007
        } else {
            return Ok(None);
        };

        let signal = TradeSignal::at_price(Self::NAME, &snapshot.symbol, TradeDirection::Long, price, risk)
            .with_metadata("std_dev", format!("{:.4}", self.model.std_dev()));
        Ok(self.state.emit(signal))
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.model.clear();
        self.state.set_param("windowSize", super::indicators::VOLATILITY_WINDOW as f64);
    }

    delegate_state!();
}

/// Takes the best routed price when it is reachable fast enough
pub struct SmartOrderRoutingArbitrageStrategy {
    router: Arc<dyn RouteProvider>,
    state: StrategyState,
}

impl SmartOrderRoutingArbitrageStrategy {
    pub const NAME: &'static str = "SmartOrderRoutingArbitrage";

    pub fn new(router: Arc<dyn RouteProvider>) -> Self {
        Self { router, state: StrategyState::new() }
    }
}

impl Strategy for SmartOrderRoutingArbitrageStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled {
            return Ok(None);
        }

        let price = entry_price(snapshot)?;
        match self.router.best_route(price) {
            Some(route) if route.latency_ms < MAX_ROUTE_LATENCY_MS => {
                let signal =
                    TradeSignal::at_price(Self::NAME, &snapshot.symbol, TradeDirection::Long, route.price, 0.005)
                        .with_metadata("latency_ms", route.latency_ms.to_string());
                Ok(self.state.emit(signal))
            }
            _ => Ok(None),
        }
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("maxLatencyMs", f64::from(MAX_ROUTE_LATENCY_MS));
    }

    delegate_state!();
}

/// Trades correlation breaks with risk scaled by a random strength draw
pub struct MultiAssetCorrelationBreakStrategy {
    indicators: IndicatorProcessor,
    rng: StdRng,
    state: StrategyState,
}

impl MultiAssetCorrelationBreakStrategy {
    pub const NAME: &'static str = "MultiAssetCorrelationBreak";

    pub fn new(indicators: IndicatorProcessor) -> Self {
        Self {
            indicators,
            rng: StdRng::from_entropy(),
            state: StrategyState::new(),
        }
    }

    pub fn with_seed(indicators: IndicatorProcessor, seed: u64) -> Self {
        Self {
            indicators,
            rng: StdRng::seed_from_u64(seed),
            state: StrategyState::new(),
        }
    }
}

impl Strategy for MultiAssetCorrelationBreakStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot) -> Result<Option<TradeSignal>, StrategyError> {
        if !self.state.enabled {
            return Ok(None);
        }

        let price = entry_price(snapshot)?;
        if self.indicators.is_correlation_diverging(price) {
            let risk = 0.006 + 0.004 * self.rng.gen::<f64>();
            let signal = TradeSignal::at_price(Self::NAME, &snapshot.symbol, TradeDirection::Long, price, risk);
            return Ok(self.state.emit(signal));
        }

        Ok(None)
    }

    fn initialize(&mut self) {
        self.state.reset();
        self.state.set_param("baseRisk", 0.006);
        self.state.set_param("riskSpread", 0.004);
    }

    delegate_state!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{Ohlcv, TimeFrame};
    use crate::ports::routing::RouteQuote;
    use approx::assert_relative_eq;
    use chrono::Utc;

    struct FixedNews {
        event: bool,
        sentiment: f64,
    }

    impl NewsFeed for FixedNews {
        fn is_major_event_active(&self) -> bool {
            self.event
        }

        fn sentiment_score(&self) -> f64 {
            self.sentiment
        }
    }

    struct FixedRoute(Option<RouteQuote>);

    impl RouteProvider for FixedRoute {
        fn best_route(&self, _price: f64) -> Option<RouteQuote> {
            self.0
        }
    }

    fn at(price: f64) -> MarketSnapshot {
        let now = Utc::now();
        MarketSnapshot::new("ES", now)
            .with_bar(TimeFrame::M1, Ohlcv::new(price, price + 1.0, price - 1.0, price, 1_000, now))
    }

    #[test]
    fn test_fifteen_min_breakout() {
        let mut strategy = PredicateStrategy::fifteen_min_breakout(IndicatorProcessor::new());
        strategy.initialize();

        let signal = strategy.evaluate(&at(5005.0)).unwrap().expect("trending above 5000");
        assert_eq!(signal.strategy, "15mBreakout");
        assert_eq!(signal.risk_amount, 0.007);
        assert!(signal.bracket.is_none());

        // Trending but below the 5000 floor
        assert!(strategy.evaluate(&at(4995.0)).unwrap().is_none());
        assert_eq!(strategy.metrics().signals_generated, 1);
        assert_eq!(strategy.parameters().get("riskPerTrade").map(ToString::to_string), Some("0.007".to_string()));
    }

    #[test]
    fn test_adx_trend_rider_skips_choppy() {
        let mut strategy = PredicateStrategy::adx_trend_rider(IndicatorProcessor::new());
        assert!(strategy.evaluate(&at(4505.0)).unwrap().is_some());
        // 4515 = 5 * 903 = 7 * 645 is both trending and choppy
        assert!(strategy.evaluate(&at(4515.0)).unwrap().is_none());
    }

    #[test]
    fn test_premarket_pivot() {
        let mut strategy = PredicateStrategy::premarket_pivot(IndicatorProcessor::new());
        assert!(strategy.evaluate(&at(4499.0)).unwrap().is_some());
        // 4510 is a volume spike but also trending
        assert!(strategy.evaluate(&at(4510.0)).unwrap().is_none());
    }

    #[test]
    fn test_liquidity_sweep_reversal() {
        let mut strategy = PredicateStrategy::liquidity_sweep_reversal(IndicatorProcessor::new());
        // 13 * 17 * 20 = 4420
        assert!(strategy.evaluate(&at(4420.0)).unwrap().is_some());
        assert!(strategy.evaluate(&at(4511.0)).unwrap().is_none());
    }

    #[test]
    fn test_adaptive_breakout_confirmation() {
        let mut strategy = PredicateStrategy::adaptive_breakout_confirmation(IndicatorProcessor::new());
        // 5 * 11 * 23 = 1265
        assert!(strategy.evaluate(&at(1265.0 * 4.0)).unwrap().is_some());
        assert!(strategy.evaluate(&at(4510.0)).unwrap().is_none());
    }

    #[test]
    fn test_swing_failure_pattern() {
        let mut strategy = PredicateStrategy::swing_failure_pattern(IndicatorProcessor::new());
        assert!(strategy.evaluate(&at(4524.0)).unwrap().is_some());
        assert!(strategy.evaluate(&at(4525.0)).unwrap().is_none());
    }

    #[test]
    fn test_order_book_pressure() {
        let mut strategy = PredicateStrategy::order_book_pressure_scalping(IndicatorProcessor::new());
        let mut snap = at(4500.5);
        assert!(strategy.evaluate(&snap).unwrap().is_none());

        snap.order_book.add_bid(4500.25, 300);
        snap.order_book.add_ask(4500.75, 100);
        assert!(strategy.evaluate(&snap).unwrap().is_some());
    }

    #[test]
    fn test_predicate_missing_price() {
        let mut strategy = PredicateStrategy::adx_trend_rider(IndicatorProcessor::new());
        let snap = MarketSnapshot::new("ES", Utc::now());
        assert!(matches!(strategy.evaluate(&snap), Err(StrategyError::MissingData(_))));
    }

    #[test]
    fn test_disabled_predicate_is_silent() {
        let mut strategy = PredicateStrategy::swing_failure_pattern(IndicatorProcessor::new());
        strategy.set_enabled(false);
        assert!(strategy.evaluate(&at(4524.0)).unwrap().is_none());
    }

    #[test]
    fn test_news_reaction_long_and_fade() {
        let bullish = Arc::new(FixedNews { event: true, sentiment: 0.8 });
        let mut strategy = QuantNewsEventReactionStrategy::new(IndicatorProcessor::new(), bullish);
        let signal = strategy.evaluate(&at(4503.0)).unwrap().expect("bullish reaction");
        assert_eq!(signal.direction, TradeDirection::Long);
        assert_eq!(signal.entry_price, 4503.0);

        let bearish = Arc::new(FixedNews { event: true, sentiment: 0.2 });
        let mut strategy = QuantNewsEventReactionStrategy::new(IndicatorProcessor::new(), bearish);
        let signal = strategy.evaluate(&at(4503.0)).unwrap().expect("fade");
        assert_eq!(signal.direction, TradeDirection::Short);
        assert_relative_eq!(signal.entry_price, 4503.0 * 0.99);
    }

    #[test]
    fn test_news_reaction_needs_event_and_conviction() {
        let quiet = Arc::new(FixedNews { event: false, sentiment: 0.9 });
        let mut strategy = QuantNewsEventReactionStrategy::new(IndicatorProcessor::new(), quiet);
        assert!(strategy.evaluate(&at(4503.0)).unwrap().is_none());

        let neutral = Arc::new(FixedNews { event: true, sentiment: 0.5 });
        let mut strategy = QuantNewsEventReactionStrategy::new(IndicatorProcessor::new(), neutral);
        assert!(strategy.evaluate(&at(4503.0)).unwrap().is_none());
    }

    #[test]
    fn test_sentiment_overlay() {
        let news = Arc::new(FixedNews { event: false, sentiment: 0.75 });
        let mut strategy = RealTimeSentimentOverlayStrategy::new(IndicatorProcessor::new(), news);
        assert!(strategy.evaluate(&at(4505.0)).unwrap().is_some());
        assert!(strategy.evaluate(&at(4506.0)).unwrap().is_none());
    }

    #[test]
    fn test_scheduled_event_overlay() {
        let news = Arc::new(FixedNews { event: true, sentiment: 0.5 });
        let mut strategy = ScheduledEventVolatilityOverlayStrategy::new(news);
        let mut snap = at(4500.0);
        assert!(strategy.evaluate(&snap).unwrap().is_none());

        snap.volatility.high_regime = true;
        let signal = strategy.evaluate(&snap).unwrap().expect("event overlay");
        assert_eq!(signal.risk_amount, 0.012);
    }

    #[test]
    fn test_volatility_clustering_regimes() {
        let mut strategy = VolatilityClusteringRegimeSwitchStrategy::new();

        // Single price: zero dispersion is the low regime
        let signal = strategy.evaluate(&at(4500.0)).unwrap().expect("low regime");
        assert_eq!(signal.risk_amount, 0.007);

        // 4500 / 4516: std dev 8, neither regime
        assert!(strategy.evaluate(&at(4516.0)).unwrap().is_none());

        // Widen the window past the high threshold
        let signal = strategy.evaluate(&at(4560.0)).unwrap().expect("high regime");
        assert_eq!(signal.risk_amount, 0.009);
        assert_eq!(strategy.model().len(), 3);

        strategy.initialize();
        assert!(strategy.model().is_empty());
    }

    #[test]
    fn test_routing_arbitrage_latency_gate() {
        let fast = Arc::new(FixedRoute(Some(RouteQuote { price: 4499.5, latency_ms: 12 })));
        let mut strategy = SmartOrderRoutingArbitrageStrategy::new(fast);
        let signal = strategy.evaluate(&at(4500.0)).unwrap().expect("fast route");
        assert_eq!(signal.entry_price, 4499.5);
        assert_eq!(signal.metadata.get("latency_ms"), Some(&"12".to_string()));

        let slow = Arc::new(FixedRoute(Some(RouteQuote { price: 4499.5, latency_ms: 50 })));
        let mut strategy = SmartOrderRoutingArbitrageStrategy::new(slow);
        assert!(strategy.evaluate(&at(4500.0)).unwrap().is_none());

        let none = Arc::new(FixedRoute(None));
        let mut strategy = SmartOrderRoutingArbitrageStrategy::new(none);
        assert!(strategy.evaluate(&at(4500.0)).unwrap().is_none());
    }

    #[test]
    fn test_correlation_break_risk_range() {
        let mut strategy = MultiAssetCorrelationBreakStrategy::with_seed(IndicatorProcessor::new(), 7);
        for _ in 0..20 {
            let signal = strategy.evaluate(&at(4526.0)).unwrap().expect("divergence");
            assert!(signal.risk_amount >= 0.006 && signal.risk_amount < 0.010);
        }
        assert!(strategy.evaluate(&at(4527.0)).unwrap().is_none());
        assert_eq!(strategy.metrics().signals_generated, 20);
    }
}
