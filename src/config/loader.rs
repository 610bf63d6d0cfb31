//! Configuration Loader
//!
//! Loads and validates the bot configuration from TOML. Every section is
//! optional and falls back to its defaults.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::simulated::SimulationParams;
use crate::application::engine::EngineConfig;
use crate::domain::risk::RiskLimits;
use crate::domain::session::{parse_session_time, MarketSession};
use crate::strategy::StrategyRegistry;

/// Environment variable that overrides `engine.symbol`
pub const SYMBOL_ENV: &str = "BOT_SYMBOL";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSection,
    pub session: SessionSection,
    pub risk: RiskSection,
    pub market_data: MarketDataSection,
    pub strategies: StrategiesSection,
    pub logging: LoggingSection,
}

/// Engine loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Instrument the engine trades
    pub symbol: String,
    /// Fixed-rate loop period
    pub tick_interval_ms: u64,
    /// How long `stop` waits for the loop before aborting it
    pub shutdown_timeout_secs: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            symbol: "ES".to_string(),
            tick_interval_ms: 1_000,
            shutdown_timeout_secs: 10,
        }
    }
}

/// Regular trading hours for the snapshot strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub enforce: bool,
    /// IANA zone name of the exchange clock
    pub timezone: String,
    /// Local open, "HH:MM"
    pub open: String,
    /// Local close, "HH:MM", exclusive
    pub close: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            enforce: true,
            timezone: "America/New_York".to_string(),
            open: "09:30".to_string(),
            close: "16:00".to_string(),
        }
    }
}

impl SessionSection {
    pub fn to_session(&self) -> Result<MarketSession, ConfigError> {
        let timezone: Tz = self.timezone.trim().parse().map_err(|_| {
            ConfigError::ValidationError(format!("session.timezone is not a known zone: {:?}", self.timezone))
        })?;
        let open = parse_session_time(&self.open).ok_or_else(|| {
            ConfigError::ValidationError(format!("session.open must be HH:MM, got {:?}", self.open))
        })?;
        let close = parse_session_time(&self.close).ok_or_else(|| {
            ConfigError::ValidationError(format!("session.close must be HH:MM, got {:?}", self.close))
        })?;

        if open >= close {
            return Err(ConfigError::ValidationError(format!(
                "session.open ({}) must be before session.close ({})",
                self.open, self.close
            )));
        }

        Ok(MarketSession {
            timezone,
            open_minute: open,
            close_minute: close,
            enforce: self.enforce,
        })
    }
}

/// Signal gates and trade caps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub min_confidence: f64,
    pub min_risk_reward: f64,
    /// Fraction of equity, 0.02 = 2%
    pub max_risk_per_trade: f64,
    /// Cap for price-only signals, 0.01 = 1%
    pub max_price_only_risk: f64,
    pub max_trades_per_strategy_per_day: u32,
}

impl Default for RiskSection {
    fn default() -> Self {
        let limits = RiskLimits::default();
        Self {
            min_confidence: limits.min_confidence,
            min_risk_reward: limits.min_risk_reward,
            max_risk_per_trade: limits.max_risk_per_trade,
            max_price_only_risk: limits.max_price_only_risk,
            max_trades_per_strategy_per_day: limits.max_trades_per_strategy_per_day,
        }
    }
}

/// Synthetic feed shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataSection {
    pub base_price: f64,
    pub price_range: f64,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for MarketDataSection {
    fn default() -> Self {
        let params = SimulationParams::default();
        Self {
            base_price: params.base_price,
            price_range: params.price_range,
            seed: params.seed,
        }
    }
}

/// Strategy lineup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategiesSection {
    /// Strategy names to run; empty means the default lineup
    pub enabled: Vec<String>,
}

/// Logging configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "warn".to_string() }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
///
/// `~` in the path is expanded. `BOT_SYMBOL` from the environment (or a
/// `.env` file loaded beforehand) replaces `engine.symbol`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let raw = path.as_ref().to_string_lossy();
    let expanded = shellexpand::tilde(raw.as_ref()).into_owned();

    let content = std::fs::read_to_string(expanded)?;
    let mut config = Config::from_toml_str(&content)?;
    config.apply_symbol_override(std::env::var(SYMBOL_ENV).ok());
    config.validate()?;
    Ok(config)
}

/// Load `path` when given, otherwise validated defaults with the same
/// environment override applied
pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = Config::default();
            config.apply_symbol_override(std::env::var(SYMBOL_ENV).ok());
            config.validate()?;
            Ok(config)
        }
    }
}

impl Config {
    /// Parse without validating or consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Replace the configured symbol when an override is present and non-blank
    pub fn apply_symbol_override(&mut self, symbol: Option<String>) {
        if let Some(symbol) = symbol.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            tracing::debug!("Symbol overridden by {}: {}", SYMBOL_ENV, symbol);
            self.engine.symbol = symbol;
        }
    }

    /// Strategy names to run, in order
    pub fn lineup(&self) -> Vec<String> {
        if self.strategies.enabled.is_empty() {
            StrategyRegistry::default_lineup()
        } else {
            self.strategies.enabled.clone()
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate engine section
        if self.engine.symbol.trim().is_empty() {
            return Err(ConfigError::ValidationError("engine.symbol cannot be empty".to_string()));
        }

        if self.engine.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "engine.tick_interval_ms must be > 0".to_string(),
            ));
        }

        if self.engine.shutdown_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "engine.shutdown_timeout_secs must be > 0".to_string(),
            ));
        }

        self.session.to_session()?;

        // Validate risk section
        if !(0.0..=1.0).contains(&self.risk.min_confidence) {
            return Err(ConfigError::ValidationError(format!(
                "risk.min_confidence must be 0-1, got {}",
                self.risk.min_confidence
            )));
        }

        if self.risk.min_risk_reward.is_nan() || self.risk.min_risk_reward < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "risk.min_risk_reward must be >= 0, got {}",
                self.risk.min_risk_reward
            )));
        }

        if !(self.risk.max_risk_per_trade > 0.0 && self.risk.max_risk_per_trade <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "risk.max_risk_per_trade must be in (0, 1], got {}",
                self.risk.max_risk_per_trade
            )));
        }

        if !(self.risk.max_price_only_risk > 0.0 && self.risk.max_price_only_risk <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "risk.max_price_only_risk must be in (0, 1], got {}",
                self.risk.max_price_only_risk
            )));
        }

        if self.risk.max_trades_per_strategy_per_day == 0 {
            return Err(ConfigError::ValidationError(
                "risk.max_trades_per_strategy_per_day must be > 0".to_string(),
            ));
        }

        // Validate market data
        let base_ok = self.market_data.base_price > 0.0 && self.market_data.base_price.is_finite();
        let range_ok = self.market_data.price_range >= 0.0 && self.market_data.price_range.is_finite();
        if !(base_ok && range_ok) {
            return Err(ConfigError::ValidationError(format!(
                "market_data needs base_price > 0 and price_range >= 0, got {} / {}",
                self.market_data.base_price, self.market_data.price_range
            )));
        }

        // Validate strategies
        let mut seen = Vec::new();
        for name in &self.strategies.enabled {
            if !StrategyRegistry::is_known(name) {
                return Err(ConfigError::ValidationError(format!("Unknown strategy: {}", name)));
            }
            if seen.contains(&name) {
                return Err(ConfigError::ValidationError(format!("Strategy listed twice: {}", name)));
            }
            seen.push(name);
        }

        // Validate logging
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}

impl From<&Config> for RiskLimits {
    fn from(config: &Config) -> Self {
        RiskLimits {
            min_confidence: config.risk.min_confidence,
            min_risk_reward: config.risk.min_risk_reward,
            max_risk_per_trade: config.risk.max_risk_per_trade,
            max_price_only_risk: config.risk.max_price_only_risk,
            max_trades_per_strategy_per_day: config.risk.max_trades_per_strategy_per_day,
        }
    }
}

impl From<&Config> for SimulationParams {
    fn from(config: &Config) -> Self {
        SimulationParams {
            base_price: config.market_data.base_price,
            price_range: config.market_data.price_range,
            seed: config.market_data.seed,
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        EngineConfig {
            symbol: config.engine.symbol.clone(),
            tick_interval: Duration::from_millis(config.engine.tick_interval_ms),
            shutdown_timeout: Duration::from_secs(config.engine.shutdown_timeout_secs),
            lineup: config.lineup(),
            risk: RiskLimits::from(config),
        }
    }
}
