//! Swap Bridge - Two-Network Token Swap Backend
//!
//! Bridges two token networks: a user requests a swap, is issued a deposit
//! address on the source network, deposits funds, and the bridge detects the
//! deposit, aggregates it with other pending deposits to the same recipient,
//! and dispatches a batched payout on the destination network.
//!
//! ## Pipeline
//!
//! 1. **AccountAllocator** - idempotently maps a user's destination address
//!    to a deposit address on the opposite network
//! 2. **DepositReconciler** - records newly confirmed deposits as pending
//!    swaps, deduplicated by source transaction hash
//! 3. **SettlementOrchestrator** - the periodic job that aggregates pending
//!    swaps per recipient, dispatches the batched payout, and durably marks
//!    the settled swaps
//!
//! The persistence layer is the single source of truth: allocation races and
//! deposit deduplication are resolved by its uniqueness constraints, and
//! settlement marking is one atomic write.

pub mod api;
pub mod chains;
pub mod common;
pub mod config;
pub mod logging;
pub mod settlement;
pub mod storage;
pub mod swaps;
pub mod types;

// Re-exports: errors
pub use common::error::{BridgeError, Result};

// Re-exports: configuration
pub use config::{BridgeConfig, ConfigError};

// Re-exports: chain clients
pub use chains::{
    ChainClient, ChainError, ChainRegistry, ForeignChainClient, HomeLedgerClient,
    IncomingTransaction, MintedAddress, PaymentOutput,
};

// Re-exports: storage
pub use storage::{
    AccountStore, LedgerStore, MemoryLedgerStore, SqliteLedgerStore, StorageError, SwapStore,
};

// Re-exports: swap lifecycle
pub use swaps::{AccountAllocator, DepositReconciler};

// Re-exports: settlement
pub use settlement::{
    aggregate, parse_amount, AggregatedOutput, DispatchConfig, SettlementDispatcher,
    SettlementOrchestrator, SettlementReport,
};

// Re-exports: types
pub use types::{
    Amount, ClientAccount, Network, PendingPayout, Swap, SwapDirection, SwapStatus,
};
