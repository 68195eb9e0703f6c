// Source: Binance spot websocket, partial book depth stream `<symbol>@depth<levels>@<speed>ms`
use serde::{Deserialize, Serialize};

use crate::engine::types::DepthSnapshot;

// Outgoing: {"method":"SUBSCRIBE","params":["btcusdt@depth20@100ms"],"id":1}
#[derive(Debug, Serialize)]
pub struct SubscribeRequest<'a> {
    pub method: &'a str,
    pub params: Vec<String>,
    pub id: u64,
}

impl<'a> SubscribeRequest<'a> {
    pub fn depth(stream: String, id: u64) -> Self {
        Self { method: "SUBSCRIBE", params: vec![stream], id }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct WsErrorBody {
    pub code: i64,
    pub msg: String,
}

// Incoming frames on the raw /ws endpoint. Variant order matters for untagged matching.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WsFrame {
    Depth(DepthSnapshot),
    Error { error: WsErrorBody, id: Option<u64> },
    // {"result":null,"id":1}
    Ack { result: Option<serde_json::Value>, id: u64 },
}

pub fn depth_stream_name(symbol: &str, levels: u16, speed_ms: u32) -> String {
    format!("{}@depth{}@{}ms", symbol.to_lowercase(), levels, speed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_name() {
        assert_eq!(depth_stream_name("BTCUSDT", 20, 100), "btcusdt@depth20@100ms");
    }

    #[test]
    fn test_subscribe_request_shape() {
        let req = SubscribeRequest::depth(depth_stream_name("BTCUSDT", 20, 100), 1);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"method": "SUBSCRIBE", "params": ["btcusdt@depth20@100ms"], "id": 1})
        );
    }

    #[test]
    fn test_frames_decode() {
        let ack: WsFrame = serde_json::from_str(r#"{"result":null,"id":1}"#).unwrap();
        assert_eq!(ack, WsFrame::Ack { result: None, id: 1 });

        let err: WsFrame = serde_json::from_str(r#"{"error":{"code":2,"msg":"Invalid request"},"id":1}"#).unwrap();
        assert!(matches!(err, WsFrame::Error { error: WsErrorBody { code: 2, .. }, .. }));

        let depth: WsFrame =
            serde_json::from_str(r#"{"lastUpdateId":42,"bids":[["100.0","0.5"]],"asks":[["100.1","0.25"]]}"#).unwrap();
        match depth {
            WsFrame::Depth(s) => {
                assert_eq!(s.last_update_id, Some(42));
                assert_eq!(s.asks[0].1, "0.25");
            }
            other => panic!("expected depth, got {other:?}"),
        }
    }
}
