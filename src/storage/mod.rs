//! Storage Layer Module
//!
//! Persistence for the swap ledger: client accounts and swaps.
//!
//! This module contains:
//! - Storage trait definitions for abstraction
//! - SQLite implementation for production
//! - In-memory implementation for testing

pub mod memory;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience
pub use memory::MemoryLedgerStore;
pub use sqlite::SqliteLedgerStore;
pub use traits::{AccountStore, LedgerStore, StorageError, StorageResult, SwapStore};
