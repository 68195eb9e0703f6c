use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::engine::estimator::Estimate;

/// Whether the raw movement is divided by the average reversion rate of both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalNormalization {
    /// `movement` as computed, no rescaling.
    #[default]
    Raw,
    /// `movement / ((nu_bid + nu_ask) / 2)`.
    MeanNu,
}

impl SignalNormalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalNormalization::Raw => "raw",
            SignalNormalization::MeanNu => "mean_nu",
        }
    }
}

/// Expected midprice movement, current and the value before it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signal {
    pub current: f64,
    pub previous: f64,
}

impl Signal {
    fn shift(&mut self, next: f64) {
        self.previous = self.current;
        self.current = next;
    }

    /// True when the signal changed sign strictly between the two values.
    pub fn crossed_zero(&self) -> bool {
        self.current * self.previous < 0.0
    }
}

#[derive(Debug, Clone)]
pub struct SignalComposer {
    theta: f64,
    normalization: SignalNormalization,
    signal: Signal,
}

impl SignalComposer {
    pub fn new(theta: f64, normalization: SignalNormalization) -> Self {
        Self { theta, normalization, signal: Signal::default() }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Expected midprice movement for a pair of estimates, `None` if either reversion rate is undefined.
    pub fn movement(&self, bid: &Estimate, ask: &Estimate) -> Option<f64> {
        let (nu_bid, nu_ask) = (bid.nu?, ask.nu?);

        let bid_term = nu_bid * (bid.mu / bid.latest as f64 - 1.0);
        let ask_term = nu_ask * (ask.mu / ask.latest as f64 - 1.0);
        let raw = self.theta * (bid_term - ask_term) / 2.0;

        let movement = match self.normalization {
            SignalNormalization::Raw => raw,
            SignalNormalization::MeanNu => raw / ((nu_bid + nu_ask) / 2.0),
        };
        movement.is_finite().then_some(movement)
    }

    /// Shift the signal forward when both sides are defined. The stored signal is untouched otherwise.
    pub fn compose(&mut self, bid: &Estimate, ask: &Estimate) -> Option<Signal> {
        let movement = self.movement(bid, ask)?;
        self.signal.shift(movement);
        trace!(current = self.signal.current, previous = self.signal.previous, "signal updated");
        Some(self.signal)
    }
}
