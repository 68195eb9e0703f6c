// Router orchestrates adapter + trader: one consumer, one snapshot at a time, in arrival order.
use crate::engine::trader::{TickOutcome, Trader};
use crate::execution::OrderGateway;
use crate::market_data::adapters::{FeedError, MarketEvent, VenueAdapter};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub dropped: u64,
    pub orders_sent: u64,
    pub orders_failed: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Traded { .. } => self.orders_sent += 1,
            TickOutcome::OrderFailed { .. } => self.orders_failed += 1,
            _ => {}
        }
    }
}

/// Drive `trader` from `adapter` until the feed ends, fails, or `shutdown` flips.
///
/// Orders are awaited inline, so a slow gateway slows consumption; the adapter
/// drops snapshots once `channel_capacity` are queued. An order that is in flight
/// when shutdown is requested still completes.
pub async fn run<A, G>(
    adapter: A,
    mut trader: Trader,
    gateway: G,
    channel_capacity: usize,
    mut shutdown: watch::Receiver<bool>,
) -> Result<RunSummary, FeedError>
where
    A: VenueAdapter + 'static,
    G: OrderGateway,
{
    let (tx, mut rx) = mpsc::channel::<MarketEvent>(channel_capacity);
    let mut feed = tokio::spawn(async move { adapter.spawn(tx).await });
    let mut summary = RunSummary::default();
    let symbol = trader.config().symbol.clone();

    info!(%symbol, window = trader.config().window, threshold = trader.config().threshold, "trader running");

    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                let Some(MarketEvent::Snapshot { symbol: event_symbol, snapshot, ts_ms }) = maybe_event else {
                    break;
                };
                if !event_symbol.eq_ignore_ascii_case(&symbol) {
                    warn!(%event_symbol, "snapshot for another symbol, ignoring");
                    continue;
                }
                summary.ticks += 1;
                metrics::counter!("ouflow_ticks_total").increment(1);

                match trader.on_snapshot(&snapshot, &gateway).await {
                    Ok(outcome) => {
                        debug!(ts_ms, ?outcome, "tick processed");
                        summary.record(&outcome);
                    }
                    Err(e) => {
                        summary.dropped += 1;
                        metrics::counter!("ouflow_ticks_dropped_total", "reason" => e.reason()).increment(1);
                        warn!(ts_ms, error = %e, "dropping tick");
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("shutdown requested, stopping consumption");
                    feed.abort();
                    break;
                }
            }
        }
    }

    // close the channel so a feed blocked on send can finish
    drop(rx);
    let result = match (&mut feed).await {
        Ok(Ok(())) => Ok(summary),
        Ok(Err(e)) => Err(e),
        Err(join) if join.is_cancelled() => Ok(summary),
        Err(join) => Err(FeedError::Task(join.to_string())),
    };

    match &result {
        Ok(s) => info!(
            ticks = s.ticks, dropped = s.dropped, orders_sent = s.orders_sent,
            orders_failed = s.orders_failed, position = %trader.state(), "trader stopped"
        ),
        Err(e) => error!(error = %e, position = %trader.state(), "market data feed failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraderConfig;
    use crate::engine::types::{DepthSnapshot, PositionState, Side};
    use crate::execution::{DryRunGateway, OrderAck, OrderError};
    use crate::market_data::adapters::replay::ReplayAdapter;
    use std::sync::Mutex;

    struct FailingFeed;

    #[async_trait::async_trait]
    impl VenueAdapter for FailingFeed {
        async fn spawn(&self, tx: mpsc::Sender<MarketEvent>) -> Result<(), FeedError> {
            let snapshot = DepthSnapshot::new(
                vec![("1".into(), "1".into())],
                vec![("2".into(), "1".into())],
            );
            let _ = tx.send(MarketEvent::Snapshot { symbol: "BTCUSDT".into(), snapshot, ts_ms: 0 }).await;
            Err(FeedError::Closed)
        }
    }

    struct PendingFeed;

    #[async_trait::async_trait]
    impl VenueAdapter for PendingFeed {
        async fn spawn(&self, _tx: mpsc::Sender<MarketEvent>) -> Result<(), FeedError> {
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RejectingGateway {
        calls: Mutex<Vec<Side>>,
    }

    #[async_trait::async_trait]
    impl OrderGateway for RejectingGateway {
        async fn submit_market_order(&self, _symbol: &str, side: Side, _qty: f64) -> Result<OrderAck, OrderError> {
            self.calls.lock().unwrap().push(side);
            Err(OrderError::Rejected("insufficient margin".into()))
        }
    }

    fn depth_line(bid: u32, ask: u32) -> String {
        format!(r#"{{"bids":[["100","{bid}"]],"asks":[["101","{ask}"]]}}"#)
    }

    // bids rise while asks fall: both sides trend, signal goes strongly negative
    fn trending_lines() -> Vec<String> {
        vec![depth_line(10, 10), depth_line(11, 9), depth_line(12, 8)]
    }

    fn trader() -> Trader {
        Trader::new(TraderConfig { window: 2, threshold: 0.1, theta: 1.0, ..TraderConfig::default() }).unwrap()
    }

    #[tokio::test]
    async fn test_replay_drives_trader_to_short() {
        let (_tx, rx) = watch::channel(false);
        let adapter = ReplayAdapter::from_lines("BTCUSDT", trending_lines());
        let gateway = std::sync::Arc::new(DryRunGateway::new());
        let summary = run(adapter, trader(), gateway.clone(), 16, rx).await.unwrap();
        assert_eq!(summary, RunSummary { ticks: 3, dropped: 0, orders_sent: 1, orders_failed: 0 });
        assert_eq!(gateway.submitted(), 1);
    }

    #[tokio::test]
    async fn test_rejected_order_counts_as_failure() {
        let (_tx, rx) = watch::channel(false);
        let adapter = ReplayAdapter::from_lines("BTCUSDT", trending_lines());
        let gateway = std::sync::Arc::new(RejectingGateway::default());
        let summary = run(adapter, trader(), gateway.clone(), 16, rx).await.unwrap();
        assert_eq!(summary.orders_failed, 1);
        assert_eq!(*gateway.calls.lock().unwrap(), vec![Side::Sell]);
    }

    #[tokio::test]
    async fn test_bad_ticks_are_dropped_not_fatal() {
        let (_tx, rx) = watch::channel(false);
        let lines = vec![depth_line(10, 10), r#"{"bids":[],"asks":[["1","1"]]}"#.to_string(), depth_line(0, 1)];
        let adapter = ReplayAdapter::from_lines("BTCUSDT", lines);
        let summary = run(adapter, trader(), DryRunGateway::new(), 16, rx).await.unwrap();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.dropped, 2);
    }

    #[tokio::test]
    async fn test_feed_failure_is_fatal_after_drain() {
        let (_tx, rx) = watch::channel(false);
        let err = run(FailingFeed, trader(), DryRunGateway::new(), 4, rx).await.unwrap_err();
        assert!(matches!(err, FeedError::Closed));
    }

    #[tokio::test]
    async fn test_shutdown_stops_idle_feed() {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run(PendingFeed, trader(), DryRunGateway::new(), 4, rx));
        tx.send(true).unwrap();
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.ticks, 0);
    }

    #[test]
    fn test_summary_records_outcomes() {
        let mut s = RunSummary::default();
        s.record(&TickOutcome::Held { signal: Default::default(), state: PositionState::Flat });
        assert_eq!(s, RunSummary::default());
    }
}
