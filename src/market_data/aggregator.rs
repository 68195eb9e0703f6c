// Converts wire strings into one integer liquidity sample per side.
// Each level is scaled and truncated on its own before summing, never summed as floats first.

use crate::engine::types::{BookSide, DepthSnapshot, TickError};

pub const DEFAULT_SIZE_DECIMALS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthAggregator {
    pub size_scale: f64, // e.g. 1e8 => quantities in 10^-8 lots
}

impl Default for DepthAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_DECIMALS)
    }
}

impl DepthAggregator {
    pub fn new(size_decimals: u32) -> Self {
        let size_scale = 10f64.powi(size_decimals as i32);
        Self { size_scale }
    }

    pub fn qty_to_lots(&self, side: BookSide, s: &str) -> Result<i64, TickError> {
        let malformed = |reason: String| TickError::MalformedSnapshot { side, reason };

        let qty: f64 = s
            .trim()
            .parse()
            .map_err(|_| malformed(format!("quantity {s:?} is not a number")))?;
        if !qty.is_finite() || qty < 0.0 {
            return Err(malformed(format!("quantity {s:?} is not a non-negative real")));
        }

        let scaled = qty * self.size_scale;
        if scaled >= i64::MAX as f64 {
            return Err(malformed(format!("quantity {s:?} overflows the lot scale")));
        }
        // truncation toward zero, same as an integer cast of the scaled float
        Ok(scaled as i64)
    }

    /// Sum of scaled quantities over one side's `[price, qty]` levels.
    pub fn side_liquidity(&self, side: BookSide, levels: &[(String, String)]) -> Result<i64, TickError> {
        if levels.is_empty() {
            return Err(TickError::MalformedSnapshot { side, reason: "no levels".to_string() });
        }
        levels.iter().try_fold(0i64, |acc, (_price, qty)| {
            let lots = self.qty_to_lots(side, qty)?;
            acc.checked_add(lots).ok_or_else(|| TickError::MalformedSnapshot {
                side,
                reason: "aggregate liquidity overflows".to_string(),
            })
        })
    }

    /// `(bid, ask)` samples for one snapshot. Nothing is produced unless both sides parse.
    pub fn aggregate(&self, snapshot: &DepthSnapshot) -> Result<(i64, i64), TickError> {
        let bid = self.side_liquidity(BookSide::Bid, &snapshot.bids)?;
        let ask = self.side_liquidity(BookSide::Ask, &snapshot.asks)?;
        Ok((bid, ask))
    }
}
