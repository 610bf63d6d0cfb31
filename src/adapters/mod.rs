//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Simulated: synthetic market data, paper execution, static news, random routing
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod simulated;

pub use cli::CliApp;
pub use simulated::{PaperExecution, SimulatedMarketData, SimulatedRouter, SimulationParams, StaticNewsFeed};
