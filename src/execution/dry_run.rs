use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use super::gateway::{OrderAck, OrderError, OrderGateway};
use crate::engine::types::Side;

/// Acknowledges every order locally without contacting a venue.
#[derive(Debug)]
pub struct DryRunGateway {
    next_id: AtomicU64,
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self { next_id: AtomicU64::new(1) }
    }

    pub fn submitted(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed).saturating_sub(1)
    }
}

impl Default for DryRunGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderGateway for DryRunGateway {
    async fn submit_market_order(&self, symbol: &str, side: Side, quantity: f64) -> Result<OrderAck, OrderError> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(OrderError::Rejected(format!("invalid quantity {quantity}")));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let order_id = format!("dry-{id}");
        info!(%symbol, %side, quantity, order_id = %order_id, "dry-run market order");
        Ok(OrderAck { order_id, symbol: symbol.to_string(), side, quantity })
    }
}
