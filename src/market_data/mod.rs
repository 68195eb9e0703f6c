// Market data module entrypoint
pub mod adapters;   // venue-specific feeds (Binance partial depth, file replay)
pub mod aggregator; // converts wire quantity strings -> scaled integer liquidity
pub mod router;     // single consumer feeding snapshots to the trader
