//! CLI Commands
//!
//! Argument definitions for the futures strategy bot.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Futures Strategy Bot - multi-strategy signal engine with paper execution
#[derive(Parser, Debug)]
#[command(
    name = "futures-bot",
    version = env!("CARGO_PKG_VERSION"),
    about = "Multi-strategy futures signal engine with paper execution",
    long_about = "Evaluates a lineup of breakout, trend, volatility and event strategies on a \
                  fixed-rate loop, gates every signal through per-trade risk checks and daily \
                  caps, and routes the survivors to a paper venue."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the fixed-rate trading loop until Ctrl-C
    Run(RunCmd),

    /// Run a few manual cycles and print the results
    Demo(DemoCmd),

    /// List known strategies and the configured lineup
    Strategies(StrategiesCmd),
}

/// Options shared by the commands that drive the engine
#[derive(Parser, Debug, Clone, Default)]
pub struct EngineOpts {
    /// Override the traded symbol
    #[arg(long, value_name = "SYMBOL")]
    pub symbol: Option<String>,

    /// Seed the simulated feed for reproducible runs
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Evaluate snapshot strategies outside regular trading hours
    #[arg(long)]
    pub ignore_session: bool,
}

/// Start trading loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    #[command(flatten)]
    pub engine: EngineOpts,
}

/// Manual demonstration cycles
#[derive(Parser, Debug)]
pub struct DemoCmd {
    #[command(flatten)]
    pub engine: EngineOpts,

    /// Number of cycles to run
    #[arg(short, long, value_name = "N", default_value = "3")]
    pub ticks: usize,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

/// List strategies
#[derive(Parser, Debug)]
pub struct StrategiesCmd {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_demo_defaults() {
        let app = CliApp::try_parse_from(["futures-bot", "demo"]).unwrap();
        match app.command {
            Command::Demo(cmd) => {
                assert_eq!(cmd.ticks, 3);
                assert!(!cmd.json);
                assert!(cmd.engine.seed.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(app.config.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let app = CliApp::try_parse_from([
            "futures-bot", "run", "--config", "bot.toml", "--symbol", "NQ", "--seed", "9", "--debug",
        ])
        .unwrap();

        assert!(app.debug);
        assert_eq!(app.config, Some(PathBuf::from("bot.toml")));
        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.engine.symbol.as_deref(), Some("NQ"));
                assert_eq!(cmd.engine.seed, Some(9));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(CliApp::try_parse_from(["futures-bot", "swap"]).is_err());
    }
}
