//! Strategy Layer - Signal generation over market snapshots
//!
//! Two families of strategies share one contract:
//! - Snapshot-analysis strategies read bars, the order book and volatility
//!   and emit bracketed signals with a confidence
//! - Predicate strategies gate on indicator predicates, news, routing or a
//!   rolling volatility model and emit price-only signals
//!
//! `StrategyRegistry` builds either kind by name.

pub mod base;
pub mod indicators;
pub mod snapshot;
pub mod blueprint;
pub mod registry;

pub use base::{ParamValue, Strategy, StrategyError, StrategyMetrics, StrategyState};
pub use indicators::{atr, ema, rsi, IndicatorProcessor, VolatilityModel};
pub use snapshot::{AdvancedTrendStrategy, ProfessionalBreakoutStrategy, SmartExecutionStrategy, VolatilityStrategy};
pub use blueprint::{
    MultiAssetCorrelationBreakStrategy, PredicateStrategy, QuantNewsEventReactionStrategy,
    RealTimeSentimentOverlayStrategy, ScheduledEventVolatilityOverlayStrategy,
    SmartOrderRoutingArbitrageStrategy, VolatilityClusteringRegimeSwitchStrategy,
};
pub use registry::{RegistryError, StrategyDeps, StrategyRegistry, DEFAULT_LINEUP, KNOWN_STRATEGIES};
