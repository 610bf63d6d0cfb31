//! Trading Engine
//!
//! Runs the configured strategy lineup against the market data port on a
//! fixed-rate loop. Every signal passes the risk manager before it reaches
//! the execution port.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::metrics::PerformanceMetrics;
use crate::domain::risk::{RiskLimits, RiskManager};
use crate::domain::signal::TradeSignal;
use crate::ports::execution::{ExecutionPort, OrderRequest};
use crate::ports::market_data::{MarketDataError, MarketDataPort};
use crate::strategy::{ParamValue, RegistryError, Strategy, StrategyDeps, StrategyRegistry};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine not initialized")]
    NotInitialized,
    #[error("Strategy lineup is empty")]
    EmptyLineup,
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
    #[error("Strategy registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Engine settings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub symbol: String,
    /// Fixed-rate loop period
    pub tick_interval: Duration,
    /// Grace period for the loop to finish on `stop`
    pub shutdown_timeout: Duration,
    /// Strategy names in evaluation order
    pub lineup: Vec<String>,
    pub risk: RiskLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "ES".to_string(),
            tick_interval: Duration::from_secs(1),
            shutdown_timeout: Duration::from_secs(10),
            lineup: StrategyRegistry::default_lineup(),
            risk: RiskLimits::default(),
        }
    }
}

/// Outcome of one trading cycle
///
/// `failed` counts both strategy evaluation errors and orders the venue
/// refused.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub price: f64,
    pub evaluated: usize,
    pub signals: usize,
    pub executed: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Status snapshot of the engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub running: bool,
    pub initialized: bool,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub active_strategies: usize,
    pub total_strategies: usize,
}

/// Per-strategy view for reporting
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub name: String,
    pub enabled: bool,
    pub signals_generated: u64,
    pub trades_today: u32,
    pub parameters: BTreeMap<String, ParamValue>,
}

struct LoopHandle {
    handle: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

/// Strategy engine; clones share the same state
#[derive(Clone)]
pub struct TradingEngine {
    config: EngineConfig,
    registry: StrategyRegistry,
    market_data: Arc<dyn MarketDataPort>,
    execution: Arc<dyn ExecutionPort>,
    strategies: Arc<RwLock<Vec<Box<dyn Strategy>>>>,
    risk: Arc<RwLock<RiskManager>>,
    metrics: Arc<RwLock<PerformanceMetrics>>,
    is_running: Arc<RwLock<bool>>,
    initialized: Arc<RwLock<bool>>,
    cycle: Arc<Mutex<()>>,
    task: Arc<Mutex<Option<LoopHandle>>>,
}

impl TradingEngine {
    pub fn new(
        config: EngineConfig,
        deps: StrategyDeps,
        market_data: Arc<dyn MarketDataPort>,
        execution: Arc<dyn ExecutionPort>,
    ) -> Self {
        let risk = RiskManager::new(config.risk.clone());

        Self {
            config,
            registry: StrategyRegistry::new(deps),
            market_data,
            execution,
            strategies: Arc::new(RwLock::new(Vec::new())),
            risk: Arc::new(RwLock::new(risk)),
            metrics: Arc::new(RwLock::new(PerformanceMetrics::default())),
            is_running: Arc::new(RwLock::new(false)),
            initialized: Arc::new(RwLock::new(false)),
            cycle: Arc::new(Mutex::new(())),
            task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build and initialize the lineup; later calls are no-ops
    pub async fn initialize(&self) -> Result<(), EngineError> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            tracing::debug!("Trading engine already initialized");
            return Ok(());
        }

        if self.config.lineup.is_empty() {
            return Err(EngineError::EmptyLineup);
        }

        let mut lineup = self.registry.build_lineup(&self.config.lineup)?;
        for strategy in lineup.iter_mut() {
            strategy.initialize();
            tracing::debug!("Initialized strategy: {}", strategy.name());
        }
        let count = lineup.len();

        *self.strategies.write().await = lineup;
        self.metrics.write().await.reset(Utc::now());
        *initialized = true;

        tracing::info!(
            "Trading engine initialized - Symbol: {}, Strategies: {}",
            self.config.symbol,
            count
        );
        Ok(())
    }

    /// Spawn the fixed-rate loop; the first cycle runs immediately
    pub async fn start(&self) -> Result<(), EngineError> {
        if !*self.initialized.read().await {
            return Err(EngineError::NotInitialized);
        }

        let mut task = self.task.lock().await;
        {
            let mut running = self.is_running.write().await;
            if *running {
                tracing::info!("Trading engine already running");
                return Ok(());
            }
            *running = true;
        }

        let shutdown = Arc::new(Notify::new());
        let engine = self.clone();
        let signal = Arc::clone(&shutdown);
        let handle = tokio::spawn(async move { engine.run_loop(signal).await });
        *task = Some(LoopHandle { handle, shutdown });

        tracing::info!(
            "Trading engine started - Poll interval: {:?}",
            self.config.tick_interval
        );
        Ok(())
    }

    async fn run_loop(&self, shutdown: Arc<Notify>) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.notified() => break,
            }

            if !*self.is_running.read().await {
                break;
            }

            match self.tick().await {
                Ok(report) => tracing::debug!(
                    "Cycle @ {:.2}: {} evaluated, {} signals, {} executed, {} rejected, {} failed",
                    report.price,
                    report.evaluated,
                    report.signals,
                    report.executed,
                    report.rejected,
                    report.failed
                ),
                // Keep looping; the next cycle may succeed
                Err(e) => tracing::error!("Trading cycle failed: {}", e),
            }
        }

        tracing::info!("Trading loop stopped");
    }

    /// Stop the loop, waiting up to the shutdown timeout before aborting it
    pub async fn stop(&self) {
        *self.is_running.write().await = false;

        let Some(LoopHandle { handle, shutdown }) = self.task.lock().await.take() else {
            tracing::debug!("Stop requested but the trading loop is not running");
            return;
        };

        shutdown.notify_one();
        let abort = handle.abort_handle();

        match tokio::time::timeout(self.config.shutdown_timeout, handle).await {
            Ok(Ok(())) => tracing::info!("Trading engine stopped"),
            Ok(Err(e)) => tracing::warn!("Trading loop ended abnormally: {}", e),
            Err(_) => {
                tracing::warn!(
                    "Trading loop did not stop within {:?}, aborting",
                    self.config.shutdown_timeout
                );
                abort.abort();
            }
        }
    }

    /// Execute one trading cycle
    pub async fn tick(&self) -> Result<CycleReport, EngineError> {
        if !*self.initialized.read().await {
            return Err(EngineError::NotInitialized);
        }

        let _cycle = self.cycle.lock().await;

        // 1. Fetch the snapshot
        let snapshot = self.market_data.latest_snapshot(&self.config.symbol).await?;
        let mut report = CycleReport {
            price: snapshot.current_price(),
            ..CycleReport::default()
        };

        // 2. Evaluate every enabled strategy
        let signals: Vec<TradeSignal> = {
            let mut strategies = self.strategies.write().await;
            let mut signals = Vec::new();

            for strategy in strategies.iter_mut().filter(|s| s.is_enabled()) {
                report.evaluated += 1;
                match strategy.evaluate(&snapshot) {
                    Ok(Some(signal)) => {
                        tracing::debug!("{} generated {}", strategy.name(), signal);
                        signals.push(signal);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!("Strategy {} failed: {}", strategy.name(), e);
                    }
                }
            }
            signals
        };
        report.signals = signals.len();

        // 3. Risk-check and execute
        for signal in signals {
            let now = Utc::now();

            {
                let risk = self.risk.read().await;
                if let Err(violation) = risk
                    .check_daily_limit(&signal.strategy, now)
                    .and_then(|_| risk.validate(&signal))
                {
                    report.rejected += 1;
                    tracing::warn!("Signal rejected - {}: {}", signal.strategy, violation);
                    continue;
                }
            }

            let order = OrderRequest::from_signal(signal);
            match self.execution.submit(order.clone()).await {
                Ok(execution) => {
                    self.risk.write().await.record_trade(&order.signal, now);
                    self.metrics.write().await.record_execution(&order.signal, now);
                    report.executed += 1;
                    tracing::info!(
                        "Executed {} via {} - Order: {}, Fill: {:.2}",
                        order.signal,
                        execution.execution_type,
                        execution.order_id,
                        execution.fill_price
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Execution failed for {}: {}", order.signal.strategy, e);
                }
            }
        }

        Ok(report)
    }

    /// Get current status snapshot
    pub async fn status(&self) -> EngineStatus {
        let strategies = self.strategies.read().await;

        EngineStatus {
            running: *self.is_running.read().await,
            initialized: *self.initialized.read().await,
            timestamp: Utc::now(),
            symbol: self.config.symbol.clone(),
            active_strategies: strategies.iter().filter(|s| s.is_enabled()).count(),
            total_strategies: strategies.len(),
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub async fn performance_metrics(&self) -> PerformanceMetrics {
        self.metrics.read().await.clone()
    }

    pub async fn strategy_names(&self) -> Vec<String> {
        self.strategies
            .read()
            .await
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    pub async fn strategy_summaries(&self) -> Vec<StrategySummary> {
        let strategies = self.strategies.read().await;
        let risk = self.risk.read().await;

        strategies
            .iter()
            .map(|s| StrategySummary {
                name: s.name().to_string(),
                enabled: s.is_enabled(),
                signals_generated: s.metrics().signals_generated,
                trades_today: risk.trades_today(s.name()),
                parameters: s.parameters(),
            })
            .collect()
    }

    pub async fn set_strategy_enabled(&self, name: &str, enabled: bool) -> Result<(), EngineError> {
        let mut strategies = self.strategies.write().await;
        let strategy = strategies
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| EngineError::UnknownStrategy(name.to_string()))?;

        strategy.set_enabled(enabled);
        tracing::info!("Strategy {} {}", name, if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Reset daily counters (call at start of trading day)
    pub async fn reset_daily(&self) {
        self.risk.write().await.reset_daily();
    }
}
