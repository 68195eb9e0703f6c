use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Which half of the book a liquidity sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSide {
    Bid,
    Ask,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookSide::Bid => write!(f, "bid"),
            BookSide::Ask => write!(f, "ask"),
        }
    }
}

// Direction of a market order sent to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
    Short,
}

impl PositionState {
    /// Signed exposure in units of the fixed order size.
    pub fn exposure(&self) -> i8 {
        match self {
            PositionState::Flat => 0,
            PositionState::Long => 1,
            PositionState::Short => -1,
        }
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionState::Flat => write!(f, "flat"),
            PositionState::Long => write!(f, "long"),
            PositionState::Short => write!(f, "short"),
        }
    }
}

/// Top-N depth snapshot as delivered by the feed: `[price, qty]` string pairs per level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepthSnapshot {
    #[serde(rename = "lastUpdateId", default)]
    pub last_update_id: Option<u64>,
    pub bids: Vec<(String, String)>,
    pub asks: Vec<(String, String)>,
}

impl DepthSnapshot {
    pub fn new(bids: Vec<(String, String)>, asks: Vec<(String, String)>) -> Self {
        Self { last_update_id: None, bids, asks }
    }

    pub fn levels(&self, side: BookSide) -> &[(String, String)] {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }
}

/// Reasons a tick is dropped. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("malformed snapshot on {side} side: {reason}")]
    MalformedSnapshot { side: BookSide, reason: String },

    #[error("degenerate (zero) liquidity sample on {side} side")]
    DegenerateSample { side: BookSide },

    /// Only reachable by calling the estimator directly; `Trader` buffers until its windows are full.
    #[error("window holds {len} samples, estimation needs {capacity}")]
    WindowNotFull { len: usize, capacity: usize },
}

impl TickError {
    /// Short label used for the dropped-tick counter.
    pub fn reason(&self) -> &'static str {
        match self {
            TickError::MalformedSnapshot { .. } => "malformed",
            TickError::DegenerateSample { .. } => "degenerate",
            TickError::WindowNotFull { .. } => "window_not_full",
        }
    }
}
