//! CLI Adapter
//!
//! Command-line interface for the futures strategy bot.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, DemoCmd, EngineOpts, RunCmd, StrategiesCmd};
