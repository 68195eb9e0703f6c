//! Quasi-maximum-likelihood fit of a discretized Ornstein–Uhlenbeck process.
//!
//! For a full window `x[0..=n]` (n = `window`):
//!
//! ```text
//! mu   = mean(x[1..=n])
//! sum1 = Σ_{i<n} (x[i] - mu)^2 / x[i]^2
//! sum2 = Σ_{i<n} (x[i] - mu) / x[i]^2 * (x[i+1] - mu)
//! nu   = ln(sum1 / sum2) / dt        when sum1 > 0 and sum2 > 0
//! ```
//!
//! `nu` is left undefined otherwise. A ratio close to 1 gives `nu` close to 0 and is
//! reported as-is.

use tracing::trace;

use crate::engine::types::{BookSide, TickError};
use crate::engine::window::RollingWindow;

/// Long-run mean and mean-reversion rate for one side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub mu: f64,
    pub nu: Option<f64>,
    /// Newest sample in the window, the one the signal is measured against.
    pub latest: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuEstimator {
    dt: f64,
}

impl OuEstimator {
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Fit without touching the window.
    pub fn fit(&self, side: BookSide, window: &RollingWindow) -> Result<Estimate, TickError> {
        if !window.is_full() {
            return Err(TickError::WindowNotFull { len: window.len(), capacity: window.capacity() });
        }
        if window.iter().any(|x| x == 0) {
            return Err(TickError::DegenerateSample { side });
        }

        let n = window.window() as f64;
        let mu = window.iter().skip(1).map(|x| x as f64).sum::<f64>() / n;

        let (sum1, sum2) = window
            .iter()
            .zip(window.iter().skip(1))
            .fold((0.0_f64, 0.0_f64), |(s1, s2), (x, next)| {
                let x = x as f64;
                let dev = x - mu;
                let sq = x * x;
                (s1 + dev * dev / sq, s2 + dev / sq * (next as f64 - mu))
            });

        let nu = if sum1 <= 0.0 || sum2 <= 0.0 {
            None
        } else {
            Some((sum1 / sum2).ln() / self.dt)
        };

        // is_full was checked above
        let latest = window.latest().unwrap_or_default();
        trace!(%side, mu, sum1, sum2, ?nu, latest, "fitted OU parameters");
        Ok(Estimate { mu, nu, latest })
    }

    /// Fit both sides, then drop the oldest sample of each so the next tick refills them.
    /// Neither window is trimmed unless both fits succeed.
    pub fn estimate_pair(
        &self,
        bids: &mut RollingWindow,
        asks: &mut RollingWindow,
    ) -> Result<(Estimate, Estimate), TickError> {
        let bid = self.fit(BookSide::Bid, bids)?;
        let ask = self.fit(BookSide::Ask, asks)?;
        bids.trim_oldest();
        asks.trim_oldest();
        Ok((bid, ask))
    }
}
