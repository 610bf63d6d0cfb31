//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, EngineSection, LoggingSection, MarketDataSection, RiskSection, SessionSection,
    StrategiesSection, load_config, load_or_default, SYMBOL_ENV,
};
