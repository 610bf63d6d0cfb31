//! Futures Strategy Bot
//!
//! Multi-strategy signal engine running against simulated market data with
//! paper execution.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use futures_strategy_bot::adapters::cli::{CliApp, Command, DemoCmd, EngineOpts, RunCmd, StrategiesCmd};
use futures_strategy_bot::adapters::simulated::{
    PaperExecution, SimulatedMarketData, SimulatedRouter, SimulationParams, StaticNewsFeed,
};
use futures_strategy_bot::application::{CycleReport, EngineConfig, EngineStatus, StrategySummary, TradingEngine};
use futures_strategy_bot::config::{load_or_default, Config};
use futures_strategy_bot::domain::metrics::PerformanceMetrics;
use futures_strategy_bot::domain::session::MarketSession;
use futures_strategy_bot::strategy::{StrategyDeps, StrategyRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    let config = load_or_default(app.config.as_ref()).with_context(|| match &app.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid default configuration".to_string(),
    })?;

    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Demo(cmd) => demo_command(cmd, config).await,
        Command::Strategies(cmd) => strategies_command(cmd, &config),
    }
}

fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(configured).context("Invalid logging.level")?
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

/// Wire the engine to the simulated adapters
fn build_engine(mut config: Config, opts: &EngineOpts) -> Result<TradingEngine> {
    if let Some(symbol) = &opts.symbol {
        config.apply_symbol_override(Some(symbol.clone()));
    }

    let session = if opts.ignore_session {
        MarketSession::always_open()
    } else {
        config.session.to_session().context("Invalid session configuration")?
    };

    let mut params = SimulationParams::from(&config);
    if opts.seed.is_some() {
        params.seed = opts.seed;
    }

    let deps = StrategyDeps {
        session,
        news: Arc::new(StaticNewsFeed::default()),
        router: Arc::new(SimulatedRouter::new(params.seed)),
    };

    Ok(TradingEngine::new(
        EngineConfig::from(&config),
        deps,
        Arc::new(SimulatedMarketData::new(params)),
        Arc::new(PaperExecution::new()),
    ))
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    tracing::info!("Starting futures strategy bot...");

    let engine = build_engine(config, &cmd.engine)?;
    engine.initialize().await.context("Failed to initialize engine")?;
    engine.start().await.context("Failed to start engine")?;

    tracing::warn!("PAPER TRADING MODE - orders go to the simulated venue");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown signal received");

    engine.stop().await;

    let metrics = engine.performance_metrics().await;
    println!(
        "Trades: {} | Winning: {} | Win rate: {:.1}%",
        metrics.total_trades,
        metrics.winning_trades,
        metrics.win_rate * 100.0
    );
    tracing::info!("Futures strategy bot stopped");
    Ok(())
}

#[derive(Serialize)]
struct DemoCycle {
    cycle: usize,
    report: Option<CycleReport>,
    error: Option<String>,
}

#[derive(Serialize)]
struct DemoOutput {
    cycles: Vec<DemoCycle>,
    status: EngineStatus,
    metrics: PerformanceMetrics,
    strategies: Vec<StrategySummary>,
}

async fn demo_command(cmd: DemoCmd, config: Config) -> Result<()> {
    let engine = build_engine(config, &cmd.engine)?;
    engine.initialize().await.context("Failed to initialize engine")?;

    let mut cycles = Vec::with_capacity(cmd.ticks);
    for cycle in 1..=cmd.ticks {
        match engine.tick().await {
            Ok(report) => cycles.push(DemoCycle { cycle, report: Some(report), error: None }),
            Err(e) => {
                tracing::error!("Cycle {} failed: {}", cycle, e);
                cycles.push(DemoCycle { cycle, report: None, error: Some(e.to_string()) });
            }
        }
    }

    let output = DemoOutput {
        cycles,
        status: engine.status().await,
        metrics: engine.performance_metrics().await,
        strategies: engine.strategy_summaries().await,
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Demo - {} @ {} cycles", output.status.symbol, cmd.ticks);
    for cycle in &output.cycles {
        match (&cycle.report, &cycle.error) {
            (Some(r), _) => println!(
                "  Cycle {}: price {:.2} | evaluated {} | signals {} | executed {} | rejected {} | failed {}",
                cycle.cycle, r.price, r.evaluated, r.signals, r.executed, r.rejected, r.failed
            ),
            (None, Some(e)) => println!("  Cycle {}: FAILED - {}", cycle.cycle, e),
            (None, None) => {}
        }
    }

    println!(
        "\nStatus: initialized={} running={} strategies {}/{} active",
        output.status.initialized,
        output.status.running,
        output.status.active_strategies,
        output.status.total_strategies
    );
    println!(
        "Metrics: trades {} | winning {} | win rate {:.1}% | sharpe {:.2} | max drawdown {:.2}",
        output.metrics.total_trades,
        output.metrics.winning_trades,
        output.metrics.win_rate * 100.0,
        output.metrics.sharpe_ratio,
        output.metrics.max_drawdown
    );

    println!("\nStrategies:");
    for s in &output.strategies {
        println!(
            "  {:<34} {:<8} signals {:>3} | trades today {}",
            s.name,
            if s.enabled { "enabled" } else { "disabled" },
            s.signals_generated,
            s.trades_today
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct StrategyListing<'a> {
    name: &'a str,
    in_lineup: bool,
}

fn strategies_command(cmd: StrategiesCmd, config: &Config) -> Result<()> {
    let lineup = config.lineup();
    let listing: Vec<StrategyListing> = StrategyRegistry::known_names()
        .iter()
        .map(|name| StrategyListing {
            name: *name,
            in_lineup: lineup.iter().any(|l| l == name),
        })
        .collect();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Known strategies ({}), * = configured lineup:", listing.len());
    for entry in &listing {
        println!("  {} {}", if entry.in_lineup { "*" } else { " " }, entry.name);
    }
    Ok(())
}
