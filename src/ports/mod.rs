//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data snapshots
//! - Order execution
//! - News and sentiment
//! - Smart order routing

pub mod market_data;
pub mod execution;
pub mod news;
pub mod routing;
pub mod mocks;

pub use market_data::{MarketDataError, MarketDataPort};
pub use execution::{ExecutionError, ExecutionPort, ExecutionReport, OrderRequest, OrderStatus};
pub use news::NewsFeed;
pub use routing::{RouteProvider, RouteQuote};
