//! Settlement Module
//!
//! The out-of-band half of the swap pipeline: aggregation of pending swaps
//! into per-recipient outputs, batched dispatch on the destination network,
//! and idempotent completion marking.

pub mod aggregator;
pub mod dispatcher;
pub mod orchestrator;

pub use aggregator::{aggregate, parse_amount, AggregatedOutput};
pub use dispatcher::{DispatchConfig, SettlementDispatcher};
pub use orchestrator::{SettlementOrchestrator, SettlementReport};
