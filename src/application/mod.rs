pub mod engine;

pub use engine::{CycleReport, EngineConfig, EngineError, EngineStatus, StrategySummary, TradingEngine};
