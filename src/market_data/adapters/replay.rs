// Replays recorded depth payloads, one JSON document per line, for offline runs.

use std::path::Path;

use super::binance_types::WsFrame;
use super::{now_ms, FeedError, MarketEvent, VenueAdapter};
use tracing::{info, warn};

pub struct ReplayAdapter {
    pub symbol: String,
    lines: Vec<String>,
}

impl ReplayAdapter {
    pub fn from_lines<I, S>(symbol: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { symbol: symbol.to_string(), lines: lines.into_iter().map(Into::into).collect() }
    }

    pub async fn open(symbol: &str, path: &Path) -> Result<Self, FeedError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let adapter = Self::from_lines(symbol, raw.lines());
        if adapter.is_empty() {
            warn!(path = %path.display(), "replay file is empty");
        } else {
            info!(path = %path.display(), lines = adapter.len(), "loaded replay file");
        }
        Ok(adapter)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[async_trait::async_trait]
impl VenueAdapter for ReplayAdapter {
    async fn spawn(&self, tx: tokio::sync::mpsc::Sender<MarketEvent>) -> Result<(), FeedError> {
        let mut sent = 0usize;
        for (lineno, line) in self.lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let snapshot = match serde_json::from_str::<WsFrame>(line) {
                Ok(WsFrame::Depth(snapshot)) => snapshot,
                Ok(_) => continue,
                Err(e) => {
                    metrics::counter!("ouflow_ticks_dropped_total", "reason" => "undecodable").increment(1);
                    warn!(line = lineno + 1, error = %e, "skipping undecodable replay line");
                    continue;
                }
            };
            let event = MarketEvent::Snapshot { symbol: self.symbol.clone(), snapshot, ts_ms: now_ms() };
            // replay waits for the consumer instead of dropping
            if tx.send(event).await.is_err() {
                break;
            }
            sent += 1;
        }
        info!(sent, "replay finished");
        Ok(())
    }
}
