// Shared trait + event for market data adapters

use thiserror::Error;

use crate::engine::types::DepthSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    // Full top-N depth at a point in time, quantities still as wire strings
    Snapshot {
        symbol: String,
        snapshot: DepthSnapshot,
        ts_ms: u64,
    },
}

/// Feed failures. Any of these ends the run; there is no reconnection.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("subscription refused: {0}")]
    Subscribe(String),

    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("feed closed by remote")]
    Closed,

    #[error("replay source unreadable: {0}")]
    Replay(#[from] std::io::Error),

    #[error("feed task ended abnormally: {0}")]
    Task(String),
}

#[async_trait::async_trait]
pub trait VenueAdapter: Send + Sync {
    // Push events into the router until the source ends or fails.
    async fn spawn(&self, tx: tokio::sync::mpsc::Sender<MarketEvent>) -> Result<(), FeedError>;
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Hand a snapshot to the consumer without waiting. Returns `false` once the consumer is gone.
/// A full channel drops the snapshot.
pub(crate) fn offer(tx: &tokio::sync::mpsc::Sender<MarketEvent>, event: MarketEvent) -> bool {
    use tokio::sync::mpsc::error::TrySendError;

    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            metrics::counter!("ouflow_ticks_dropped_total", "reason" => "backpressure").increment(1);
            tracing::warn!("consumer behind, dropping snapshot");
            true
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

pub mod binance;
pub mod binance_types;
pub mod replay;
