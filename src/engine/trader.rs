use tracing::{debug, info, instrument, warn};

use crate::config::{SettingsError, TraderConfig};
use crate::engine::estimator::{Estimate, OuEstimator};
use crate::engine::position::{PositionController, Transition};
use crate::engine::signal::{Signal, SignalComposer};
use crate::engine::types::{BookSide, DepthSnapshot, PositionState, TickError};
use crate::engine::window::RollingWindow;
use crate::execution::{OrderAck, OrderError, OrderGateway};
use crate::market_data::aggregator::DepthAggregator;

/// Result of the synchronous part of a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Windows are still filling up.
    Buffering { len: usize, capacity: usize },
    /// At least one side had no defined reversion rate; signal and position are unchanged.
    EstimateUndefined { bid: Estimate, ask: Estimate },
    /// Signal moved; `transition` is set when the controller wants an order.
    Decided { signal: Signal, transition: Option<Transition> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Buffering { len: usize, capacity: usize },
    EstimateUndefined { bid_nu: Option<f64>, ask_nu: Option<f64> },
    Held { signal: Signal, state: PositionState },
    Traded { signal: Signal, transition: Transition, ack: OrderAck },
    /// The order did not go through, the position did not move.
    OrderFailed { signal: Signal, transition: Transition, error: OrderError },
}

/// Per-symbol pipeline: depth -> windows -> OU fit -> signal -> position.
///
/// Snapshots for one symbol must be fed one at a time, in arrival order.
#[derive(Debug)]
pub struct Trader {
    config: TraderConfig,
    aggregator: DepthAggregator,
    bids: RollingWindow,
    asks: RollingWindow,
    estimator: OuEstimator,
    composer: SignalComposer,
    controller: PositionController,
}

impl Trader {
    pub fn new(config: TraderConfig) -> Result<Self, SettingsError> {
        config.validate()?;
        Ok(Self {
            aggregator: DepthAggregator::default(),
            bids: RollingWindow::new(config.window),
            asks: RollingWindow::new(config.window),
            estimator: OuEstimator::new(config.dt),
            composer: SignalComposer::new(config.theta, config.normalization),
            controller: PositionController::new(config.threshold),
            config,
        })
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn state(&self) -> PositionState {
        self.controller.state()
    }

    pub fn signal(&self) -> Signal {
        self.composer.signal()
    }

    pub fn window(&self, side: BookSide) -> &RollingWindow {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    /// Aggregate, buffer and, once the windows are full, estimate and decide. Never talks to a gateway.
    pub fn ingest(&mut self, snapshot: &DepthSnapshot) -> Result<Evaluation, TickError> {
        let (bid, ask) = self.aggregator.aggregate(snapshot)?;
        // a zero sample would make the estimator divide by zero
        if bid == 0 {
            return Err(TickError::DegenerateSample { side: BookSide::Bid });
        }
        if ask == 0 {
            return Err(TickError::DegenerateSample { side: BookSide::Ask });
        }

        self.bids.push(bid);
        self.asks.push(ask);
        if !self.bids.is_full() {
            return Ok(Evaluation::Buffering { len: self.bids.len(), capacity: self.bids.capacity() });
        }

        let (bid_est, ask_est) = self.estimator.estimate_pair(&mut self.bids, &mut self.asks)?;

        debug!(
            mu_bid = bid_est.mu, nu_bid = ?bid_est.nu, z_bid = bid_est.latest,
            mu_ask = ask_est.mu, nu_ask = ?ask_est.nu, z_ask = ask_est.latest,
            "estimated both sides"
        );

        let Some(signal) = self.composer.compose(&bid_est, &ask_est) else {
            return Ok(Evaluation::EstimateUndefined { bid: bid_est, ask: ask_est });
        };
        metrics::gauge!("ouflow_signal").set(signal.current);

        let transition = self.controller.decide(&signal);
        Ok(Evaluation::Decided { signal, transition })
    }

    /// Full tick: `ingest`, then submit the decided order and wait for it.
    /// The position only advances once the gateway acknowledges.
    #[instrument(level = "debug", skip_all, fields(symbol = %self.config.symbol))]
    pub async fn on_snapshot<G>(&mut self, snapshot: &DepthSnapshot, gateway: &G) -> Result<TickOutcome, TickError>
    where
        G: OrderGateway + ?Sized,
    {
        let outcome = match self.ingest(snapshot)? {
            Evaluation::Buffering { len, capacity } => TickOutcome::Buffering { len, capacity },
            Evaluation::EstimateUndefined { bid, ask } => {
                debug!(nu_bid = ?bid.nu, nu_ask = ?ask.nu, "estimate undefined, holding");
                TickOutcome::EstimateUndefined { bid_nu: bid.nu, ask_nu: ask.nu }
            }
            Evaluation::Decided { signal, transition: None } => {
                TickOutcome::Held { signal, state: self.controller.state() }
            }
            Evaluation::Decided { signal, transition: Some(transition) } => {
                self.execute(signal, transition, gateway).await
            }
        };
        Ok(outcome)
    }

    async fn execute<G>(&mut self, signal: Signal, transition: Transition, gateway: &G) -> TickOutcome
    where
        G: OrderGateway + ?Sized,
    {
        info!(
            from = %transition.from, to = %transition.to, side = %transition.side,
            signal = signal.current, previous = signal.previous,
            "position transition decided"
        );

        match gateway.submit_market_order(&self.config.symbol, transition.side, self.config.qty).await {
            Ok(ack) => {
                self.controller.commit(&transition);
                metrics::counter!("ouflow_orders_total", "side" => transition.side.as_str(), "outcome" => "ack")
                    .increment(1);
                metrics::gauge!("ouflow_position").set(f64::from(self.controller.state().exposure()));
                info!(order_id = %ack.order_id, state = %self.controller.state(), "order acknowledged");
                TickOutcome::Traded { signal, transition, ack }
            }
            Err(error) => {
                metrics::counter!("ouflow_orders_total", "side" => transition.side.as_str(), "outcome" => error.kind())
                    .increment(1);
                warn!(%error, state = %self.controller.state(), "order failed, position unchanged");
                TickOutcome::OrderFailed { signal, transition, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(window: usize) -> TraderConfig {
        TraderConfig { window, threshold: 0.1, dt: 0.1, theta: 1.0, qty: 0.001, ..TraderConfig::default() }
    }

    fn snapshot(bid_qty: &str, ask_qty: &str) -> DepthSnapshot {
        DepthSnapshot::new(
            vec![("100".to_string(), bid_qty.to_string())],
            vec![("101".to_string(), ask_qty.to_string())],
        )
    }

    #[test]
    fn test_buffers_until_full() {
        let mut trader = Trader::new(config(2)).unwrap();
        assert_eq!(
            trader.ingest(&snapshot("1", "1")).unwrap(),
            Evaluation::Buffering { len: 1, capacity: 3 }
        );
        assert_eq!(
            trader.ingest(&snapshot("2", "2")).unwrap(),
            Evaluation::Buffering { len: 2, capacity: 3 }
        );
        assert!(!matches!(trader.ingest(&snapshot("3", "3")).unwrap(), Evaluation::Buffering { .. }));
        assert_eq!(trader.window(BookSide::Bid).len(), 2);
        assert_eq!(trader.window(BookSide::Ask).len(), 2);
    }

    #[test]
    fn test_malformed_snapshot_leaves_windows_alone() {
        let mut trader = Trader::new(config(2)).unwrap();
        trader.ingest(&snapshot("1", "1")).unwrap();
        let err = trader.ingest(&snapshot("1", "oops")).unwrap_err();
        assert!(matches!(err, TickError::MalformedSnapshot { side: BookSide::Ask, .. }));
        assert_eq!(trader.window(BookSide::Bid).len(), 1);
        assert_eq!(trader.window(BookSide::Ask).len(), 1);
    }

    #[test]
    fn test_zero_liquidity_is_degenerate() {
        let mut trader = Trader::new(config(2)).unwrap();
        let err = trader.ingest(&snapshot("0", "1")).unwrap_err();
        assert_eq!(err, TickError::DegenerateSample { side: BookSide::Bid });
        assert!(trader.window(BookSide::Bid).is_empty());
        assert!(trader.window(BookSide::Ask).is_empty());
    }

    #[test]
    fn test_constant_book_never_signals() {
        let mut trader = Trader::new(config(3)).unwrap();
        for _ in 0..10 {
            let eval = trader.ingest(&snapshot("0.5", "0.7")).unwrap();
            assert!(!matches!(eval, Evaluation::Decided { .. }));
        }
        assert_eq!(trader.signal(), Signal::default());
        assert_eq!(trader.state(), PositionState::Flat);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Trader::new(config(1)).is_err());
    }
}
