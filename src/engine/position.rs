//! Flat / Long / Short controller.
//!
//! Rules, first match wins, at most one per tick:
//! 1. Flat  -> Long   when `s > threshold`            (buy)
//! 2. Flat  -> Short  when `s < -threshold`           (sell)
//! 3. Short -> Flat   when `s * p < 0` and `s > 0`    (buy to cover)
//! 4. Long  -> Flat   when `s * p < 0` and `s < 0`    (sell to close)
//!
//! Deciding and committing are separate steps so a failed order leaves the state where it was.

use tracing::{debug, warn};

use crate::engine::signal::Signal;
use crate::engine::types::{PositionState, Side};

/// A decided state change and the order that realises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PositionState,
    pub to: PositionState,
    pub side: Side,
}

#[derive(Debug, Clone)]
pub struct PositionController {
    threshold: f64,
    state: PositionState,
}

impl PositionController {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, state: PositionState::Flat }
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn decide(&self, signal: &Signal) -> Option<Transition> {
        let s = signal.current;
        let (to, side) = match self.state {
            PositionState::Flat if s > self.threshold => (PositionState::Long, Side::Buy),
            PositionState::Flat if s < -self.threshold => (PositionState::Short, Side::Sell),
            PositionState::Short if signal.crossed_zero() && s > 0.0 => (PositionState::Flat, Side::Buy),
            PositionState::Long if signal.crossed_zero() && s < 0.0 => (PositionState::Flat, Side::Sell),
            _ => return None,
        };
        Some(Transition { from: self.state, to, side })
    }

    /// Apply a transition whose order went through. Stale transitions are ignored.
    pub fn commit(&mut self, transition: &Transition) -> bool {
        if self.state != transition.from {
            warn!(state = %self.state, from = %transition.from, "ignoring stale transition");
            return false;
        }
        debug!(from = %transition.from, to = %transition.to, "position state advanced");
        self.state = transition.to;
        true
    }
}
