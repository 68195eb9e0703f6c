pub mod config;
pub mod engine;
pub mod execution;
pub mod market_data;
pub mod telemetry;
