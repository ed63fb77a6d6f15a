//! Storage Trait Definitions
//!
//! Abstract storage interfaces for the swap ledger. The ledger is the single
//! source of truth and the synchronization point for idempotency: allocation
//! races and deposit deduplication are resolved by its uniqueness
//! constraints, never by in-memory state.
//!
//! Implementations can use SQLite (production) or in-memory (testing).

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::types::account::ClientAccount;
use crate::types::network::Network;
use crate::types::swap::{PendingPayout, Swap, SwapDirection};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Client account storage interface
///
/// The (user_address, user_address_network) pair is unique; `insert_account`
/// returns `Duplicate` when a concurrent allocation won the race, and the
/// caller re-reads the surviving row.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new client account
    async fn insert_account(&self, account: &ClientAccount) -> StorageResult<()>;

    /// Get an account by uuid
    async fn get_account(&self, uuid: Uuid) -> StorageResult<Option<ClientAccount>>;

    /// Get an account by its (user address, network) pair
    async fn get_account_by_user(
        &self,
        user_address: &str,
        user_network: Network,
    ) -> StorageResult<Option<ClientAccount>>;

    /// Total number of accounts
    async fn count_accounts(&self) -> StorageResult<u64>;
}

/// Swap ledger storage interface
///
/// `deposit_tx_hash` is globally unique; `insert_swap` returns `Duplicate`
/// for an already-recorded deposit.
#[async_trait]
pub trait SwapStore: Send + Sync {
    /// Insert a new swap
    async fn insert_swap(&self, swap: &Swap) -> StorageResult<()>;

    /// Get all swaps belonging to an account, oldest first
    async fn get_swaps_for_account(&self, account_uuid: Uuid) -> StorageResult<Vec<Swap>>;

    /// Get all pending swaps of one direction joined with their payout
    /// destination address, oldest first
    async fn pending_payouts(&self, direction: SwapDirection) -> StorageResult<Vec<PendingPayout>>;

    /// Mark a set of swaps settled with the dispatched transaction hashes
    ///
    /// All swaps receive the same hash list since they were physically paid
    /// together. Applied in a single transaction so a swap is never observed
    /// settled without its hashes (or the reverse).
    async fn mark_swaps_settled(&self, uuids: &[Uuid], tx_hashes: &[String]) -> StorageResult<()>;

    /// Get swap counts keyed by status
    async fn count_swaps_by_status(&self) -> StorageResult<HashMap<String, u64>>;
}

/// Combined ledger interface
pub trait LedgerStore: AccountStore + SwapStore {}

impl<T: AccountStore + SwapStore> LedgerStore for T {}
