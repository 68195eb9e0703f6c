// Binance partial-depth adapter: one subscription, one symbol, no reconnection.

use super::binance_types::{depth_stream_name, SubscribeRequest, WsFrame};
use super::{now_ms, offer, FeedError, MarketEvent, VenueAdapter};
use crate::config::FeedConfig;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

pub struct BinanceDepthAdapter {
    pub symbol: String, // e.g. "BTCUSDT"
    pub ws_url: String, // "wss://stream.binance.com:9443/ws"
    pub depth_levels: u16,
    pub update_speed_ms: u32,
}

impl BinanceDepthAdapter {
    pub fn new(symbol: &str, feed: &FeedConfig) -> Self {
        Self {
            symbol: symbol.to_string(),
            ws_url: feed.ws_url.clone(),
            depth_levels: feed.depth_levels,
            update_speed_ms: feed.update_speed_ms,
        }
    }

    pub fn stream_name(&self) -> String {
        depth_stream_name(&self.symbol, self.depth_levels, self.update_speed_ms)
    }

    /// Decode one text frame. `Ok(None)` for frames that carry no depth.
    fn handle_text(&self, text: &str) -> Result<Option<MarketEvent>, FeedError> {
        match serde_json::from_str::<WsFrame>(text) {
            Ok(WsFrame::Depth(snapshot)) => Ok(Some(MarketEvent::Snapshot {
                symbol: self.symbol.clone(),
                snapshot,
                ts_ms: now_ms(),
            })),
            Ok(WsFrame::Ack { id, .. }) => {
                info!(id, stream = %self.stream_name(), "subscription acknowledged");
                Ok(None)
            }
            Ok(WsFrame::Error { error, .. }) => Err(FeedError::Subscribe(format!("{} (code {})", error.msg, error.code))),
            Err(e) => {
                // undecodable frames are dropped like malformed ticks
                metrics::counter!("ouflow_ticks_dropped_total", "reason" => "undecodable").increment(1);
                warn!(error = %e, raw = %text, "failed to decode frame");
                Ok(None)
            }
        }
    }
}

#[async_trait::async_trait]
impl VenueAdapter for BinanceDepthAdapter {
    async fn spawn(&self, tx: tokio::sync::mpsc::Sender<MarketEvent>) -> Result<(), FeedError> {
        info!(url = %self.ws_url, "connecting to depth feed");
        let (ws_stream, response) = tokio_tungstenite::connect_async(self.ws_url.as_str())
            .await
            .map_err(|source| FeedError::Connect { url: self.ws_url.clone(), source })?;
        debug!(status = %response.status(), "websocket connected");

        let (mut write, mut read) = ws_stream.split();

        let request = SubscribeRequest::depth(self.stream_name(), 1);
        let payload = serde_json::to_string(&request).map_err(|e| FeedError::Subscribe(e.to_string()))?;
        write.send(Message::Text(payload)).await?;
        info!(stream = %self.stream_name(), "subscription sent");

        while let Some(msg) = read.next().await {
            match msg? {
                Message::Text(text) => {
                    if let Some(event) = self.handle_text(&text)? {
                        if !offer(&tx, event) {
                            debug!("consumer gone, stopping feed");
                            return Ok(());
                        }
                    }
                }
                Message::Ping(payload) => {
                    write.send(Message::Pong(payload)).await?;
                }
                Message::Close(frame) => {
                    warn!(?frame, "websocket closed by server");
                    return Err(FeedError::Closed);
                }
                other => trace!(?other, "ignoring non-text frame"),
            }
        }
        Err(FeedError::Closed)
    }
}
