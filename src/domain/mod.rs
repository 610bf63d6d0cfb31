//! Domain Layer - Core business logic for the futures strategy bot
//!
//! This module contains pure domain types and logic with no I/O.
//! All external interactions happen through the ports layer.

pub mod market;
pub mod signal;
pub mod risk;
pub mod metrics;
pub mod session;

pub use market::{MarketSnapshot, Ohlcv, OrderBookSnapshot, TimeFrame, VolatilityMetrics};
pub use signal::{Bracket, ExecutionType, TradeDirection, TradeSignal};
pub use risk::{RiskCheck, RiskLimits, RiskManager, RiskViolation};
pub use metrics::PerformanceMetrics;
pub use session::{parse_session_time, MarketSession};
