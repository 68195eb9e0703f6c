// Order execution: the gateway port and the in-process dry-run implementation
pub mod gateway;
pub mod dry_run;

pub use gateway::{OrderAck, OrderError, OrderGateway};
pub use dry_run::DryRunGateway;
