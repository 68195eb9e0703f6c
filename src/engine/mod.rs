// Core: liquidity windows, OU estimation, signal composition and the position state machine
pub mod types;
pub mod window;
pub mod estimator;
pub mod signal;
pub mod position;
pub mod trader;

pub use types::{BookSide, DepthSnapshot, PositionState, Side, TickError};
pub use trader::{Evaluation, TickOutcome, Trader};
