//! Strategy Registry
//!
//! Builds strategies by name so the engine lineup can come from config.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::session::MarketSession;
use crate::ports::news::NewsFeed;
use crate::ports::routing::RouteProvider;

use super::base::Strategy;
use super::blueprint::{
    MultiAssetCorrelationBreakStrategy, PredicateStrategy, QuantNewsEventReactionStrategy,
    RealTimeSentimentOverlayStrategy, ScheduledEventVolatilityOverlayStrategy,
    SmartOrderRoutingArbitrageStrategy, VolatilityClusteringRegimeSwitchStrategy,
};
use super::indicators::IndicatorProcessor;
use super::snapshot::{
    AdvancedTrendStrategy, ProfessionalBreakoutStrategy, SmartExecutionStrategy, VolatilityStrategy,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Duplicate strategy in lineup: {0}")]
    DuplicateStrategy(String),
}

/// Every strategy name the registry can build
pub const KNOWN_STRATEGIES: &[&str] = &[
    ProfessionalBreakoutStrategy::NAME,
    AdvancedTrendStrategy::NAME,
    VolatilityStrategy::NAME,
    SmartExecutionStrategy::NAME,
    "15mBreakout",
    "ADXTrendRider",
    "PremarketPivot",
    "LiquiditySweepReversal",
    QuantNewsEventReactionStrategy::NAME,
    VolatilityClusteringRegimeSwitchStrategy::NAME,
    SmartOrderRoutingArbitrageStrategy::NAME,
    "AdaptiveBreakoutConfirmation",
    "SwingFailurePattern",
    RealTimeSentimentOverlayStrategy::NAME,
    MultiAssetCorrelationBreakStrategy::NAME,
    "OrderBookPressureScalping",
    ScheduledEventVolatilityOverlayStrategy::NAME,
];

/// Lineup used when the config names no strategies
pub const DEFAULT_LINEUP: &[&str] = &[
    ProfessionalBreakoutStrategy::NAME,
    AdvancedTrendStrategy::NAME,
    VolatilityStrategy::NAME,
    SmartExecutionStrategy::NAME,
    "15mBreakout",
    "ADXTrendRider",
    "PremarketPivot",
];

/// Outside collaborators strategies may consult
#[derive(Clone)]
pub struct StrategyDeps {
    pub session: MarketSession,
    pub news: Arc<dyn NewsFeed>,
    pub router: Arc<dyn RouteProvider>,
}

/// Name-based strategy factory
#[derive(Clone)]
pub struct StrategyRegistry {
    deps: StrategyDeps,
    indicators: IndicatorProcessor,
}

impl StrategyRegistry {
    pub fn new(deps: StrategyDeps) -> Self {
        Self {
            deps,
            indicators: IndicatorProcessor::new(),
        }
    }

    pub fn known_names() -> &'static [&'static str] {
        KNOWN_STRATEGIES
    }

    pub fn default_lineup() -> Vec<String> {
        DEFAULT_LINEUP.iter().map(|name| name.to_string()).collect()
    }

    pub fn is_known(name: &str) -> bool {
        KNOWN_STRATEGIES.contains(&name)
    }

    pub fn build(&self, name: &str) -> Result<Box<dyn Strategy>, RegistryError> {
        let ip = self.indicators;
        let session = self.deps.session;

        let strategy: Box<dyn Strategy> = match name {
            ProfessionalBreakoutStrategy::NAME => Box::new(ProfessionalBreakoutStrategy::new(session)),
            AdvancedTrendStrategy::NAME => Box::new(AdvancedTrendStrategy::new(session)),
            VolatilityStrategy::NAME => Box::new(VolatilityStrategy::new(session)),
            SmartExecutionStrategy::NAME => Box::new(SmartExecutionStrategy::new(session)),
            "15mBreakout" => Box::new(PredicateStrategy::fifteen_min_breakout(ip)),
            "ADXTrendRider" => Box::new(PredicateStrategy::adx_trend_rider(ip)),
            "PremarketPivot" => Box::new(PredicateStrategy::premarket_pivot(ip)),
            "LiquiditySweepReversal" => Box::new(PredicateStrategy::liquidity_sweep_reversal(ip)),
            "AdaptiveBreakoutConfirmation" => Box::new(PredicateStrategy::adaptive_breakout_confirmation(ip)),
            "SwingFailurePattern" => Box::new(PredicateStrategy::swing_failure_pattern(ip)),
            "OrderBookPressureScalping" => Box::new(PredicateStrategy::order_book_pressure_scalping(ip)),
            QuantNewsEventReactionStrategy::NAME => {
                Box::new(QuantNewsEventReactionStrategy::new(ip, Arc::clone(&self.deps.news)))
            }
            RealTimeSentimentOverlayStrategy::NAME => {
                Box::new(RealTimeSentimentOverlayStrategy::new(ip, Arc::clone(&self.deps.news)))
            }
            ScheduledEventVolatilityOverlayStrategy::NAME => {
                Box::new(ScheduledEventVolatilityOverlayStrategy::new(Arc::clone(&self.deps.news)))
            }
            VolatilityClusteringRegimeSwitchStrategy::NAME => Box::new(VolatilityClusteringRegimeSwitchStrategy::new()),
            SmartOrderRoutingArbitrageStrategy::NAME => {
                Box::new(SmartOrderRoutingArbitrageStrategy::new(Arc::clone(&self.deps.router)))
            }
            MultiAssetCorrelationBreakStrategy::NAME => Box::new(MultiAssetCorrelationBreakStrategy::new(ip)),
            other => return Err(RegistryError::UnknownStrategy(other.to_string())),
        };

        Ok(strategy)
    }

    /// Build a full lineup, rejecting unknown and repeated names
    pub fn build_lineup<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Box<dyn Strategy>>, RegistryError> {
        let mut lineup: Vec<Box<dyn Strategy>> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if lineup.iter().any(|s| s.name() == name) {
                return Err(RegistryError::DuplicateStrategy(name.to_string()));
            }
            lineup.push(self.build(name)?);
        }
        Ok(lineup)
    }
}
