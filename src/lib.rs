//! Futures Strategy Bot Library
//!
//! Multi-strategy signal engine for index futures with risk gating and
//! paper execution.
//!
//! # Modules
//!
//! - `domain`: Core types (MarketSnapshot, TradeSignal, RiskManager, PerformanceMetrics, MarketSession)
//! - `ports`: Trait abstractions (MarketDataPort, ExecutionPort, NewsFeed, RouteProvider)
//! - `strategy`: Signal generation (snapshot strategies, predicate strategies, registry)
//! - `adapters`: External implementations (simulated feeds, paper venue, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Trading engine

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
