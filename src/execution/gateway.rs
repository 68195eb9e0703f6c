use async_trait::async_trait;
use thiserror::Error;

use crate::engine::types::Side;

/// Venue acknowledgement of a market order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
}

/// Failures reported by a gateway. None of them stop the trader; retries belong to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("authentication failure: {0}")]
    AuthFailure(String),
}

impl OrderError {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::Rejected(_) => "rejected",
            OrderError::NetworkFailure(_) => "network_failure",
            OrderError::AuthFailure(_) => "auth_failure",
        }
    }
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit_market_order(&self, symbol: &str, side: Side, quantity: f64) -> Result<OrderAck, OrderError>;
}

#[async_trait]
impl<G: OrderGateway + ?Sized> OrderGateway for std::sync::Arc<G> {
    async fn submit_market_order(&self, symbol: &str, side: Side, quantity: f64) -> Result<OrderAck, OrderError> {
        (**self).submit_market_order(symbol, side, quantity).await
    }
}
