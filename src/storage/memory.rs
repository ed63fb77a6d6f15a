//! In-Memory Storage Implementation
//!
//! Provides an in-memory swap ledger for testing and development.
//! Data is lost when the service restarts. Enforces the same uniqueness
//! rules as the SQLite store so idempotency tests behave identically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{AccountStore, StorageError, StorageResult, SwapStore};
use crate::types::account::ClientAccount;
use crate::types::network::Network;
use crate::types::swap::{PendingPayout, Swap, SwapDirection, SwapStatus};

/// In-memory ledger store
///
/// Thread-safe; uses Arc<RwLock<>> for concurrent access. Records are kept
/// in insertion order so pending selections are oldest-first like the
/// SQLite store.
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    accounts: Arc<RwLock<Vec<ClientAccount>>>,
    swaps: Arc<RwLock<Vec<Swap>>>,
}

impl MemoryLedgerStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryLedgerStore {
    async fn insert_account(&self, account: &ClientAccount) -> StorageResult<()> {
        let mut accounts = self.accounts.write().await;

        if accounts.iter().any(|a| {
            a.uuid == account.uuid
                || (a.user_address == account.user_address
                    && a.user_address_network == account.user_address_network)
        }) {
            return Err(StorageError::Duplicate(format!(
                "account for {} on {}",
                account.user_address, account.user_address_network
            )));
        }

        accounts.push(account.clone());
        Ok(())
    }

    async fn get_account(&self, uuid: Uuid) -> StorageResult<Option<ClientAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.uuid == uuid).cloned())
    }

    async fn get_account_by_user(
        &self,
        user_address: &str,
        user_network: Network,
    ) -> StorageResult<Option<ClientAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .find(|a| a.user_address == user_address && a.user_address_network == user_network)
            .cloned())
    }

    async fn count_accounts(&self) -> StorageResult<u64> {
        let accounts = self.accounts.read().await;
        Ok(accounts.len() as u64)
    }
}

#[async_trait]
impl SwapStore for MemoryLedgerStore {
    async fn insert_swap(&self, swap: &Swap) -> StorageResult<()> {
        let mut swaps = self.swaps.write().await;

        if swaps
            .iter()
            .any(|s| s.uuid == swap.uuid || s.deposit_tx_hash == swap.deposit_tx_hash)
        {
            return Err(StorageError::Duplicate(swap.deposit_tx_hash.clone()));
        }

        swaps.push(swap.clone());
        Ok(())
    }

    async fn get_swaps_for_account(&self, account_uuid: Uuid) -> StorageResult<Vec<Swap>> {
        let swaps = self.swaps.read().await;
        Ok(swaps
            .iter()
            .filter(|s| s.account_uuid == account_uuid)
            .cloned()
            .collect())
    }

    async fn pending_payouts(&self, direction: SwapDirection) -> StorageResult<Vec<PendingPayout>> {
        let swaps = self.swaps.read().await;
        let accounts = self.accounts.read().await;

        let mut payouts = Vec::new();
        for swap in swaps
            .iter()
            .filter(|s| s.status == SwapStatus::Pending && s.direction == direction)
        {
            let account = accounts
                .iter()
                .find(|a| a.uuid == swap.account_uuid)
                .ok_or_else(|| {
                    StorageError::InvalidData(format!(
                        "swap {} references missing account {}",
                        swap.uuid, swap.account_uuid
                    ))
                })?;

            payouts.push(PendingPayout {
                swap_uuid: swap.uuid,
                destination_address: account.user_address.clone(),
                amount: swap.amount.clone(),
            });
        }

        Ok(payouts)
    }

    async fn mark_swaps_settled(&self, uuids: &[Uuid], tx_hashes: &[String]) -> StorageResult<()> {
        let mut swaps = self.swaps.write().await;

        // Validate first so the batch is applied all-or-nothing.
        for uuid in uuids {
            let found = swaps
                .iter()
                .any(|s| s.uuid == *uuid && s.status == SwapStatus::Pending);
            if !found {
                return Err(StorageError::NotFound(format!("pending swap {}", uuid)));
            }
        }

        for swap in swaps.iter_mut() {
            if uuids.contains(&swap.uuid) {
                swap.transfer_tx_hashes = tx_hashes.to_vec();
                swap.status = SwapStatus::Settled;
            }
        }

        Ok(())
    }

    async fn count_swaps_by_status(&self) -> StorageResult<HashMap<String, u64>> {
        let swaps = self.swaps.read().await;

        let mut counts = HashMap::new();
        for swap in swaps.iter() {
            *counts.entry(swap.status.to_string()).or_insert(0) += 1;
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::swap::Amount;

    #[tokio::test]
    async fn test_duplicate_rules_match_sqlite() {
        let store = MemoryLedgerStore::new();
        let account = ClientAccount::new(
            "user1".to_string(),
            Network::Foreign,
            "dep1".to_string(),
            "secret".to_string(),
        );
        store.insert_account(&account).await.unwrap();

        let racing = ClientAccount::new(
            "user1".to_string(),
            Network::Foreign,
            "dep2".to_string(),
            "secret2".to_string(),
        );
        assert!(matches!(
            store.insert_account(&racing).await,
            Err(StorageError::Duplicate(_))
        ));

        let swap = Swap::new(
            account.uuid,
            SwapDirection::HomeToForeign,
            Amount::Base(100),
            "txhash1".to_string(),
        );
        store.insert_swap(&swap).await.unwrap();

        let dup = Swap::new(
            account.uuid,
            SwapDirection::HomeToForeign,
            Amount::Base(200),
            "txhash1".to_string(),
        );
        assert!(matches!(
            store.insert_swap(&dup).await,
            Err(StorageError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_mark_settled_all_or_nothing() {
        let store = MemoryLedgerStore::new();
        let account = ClientAccount::new(
            "user1".to_string(),
            Network::Foreign,
            "dep1".to_string(),
            "secret".to_string(),
        );
        store.insert_account(&account).await.unwrap();

        let swap = Swap::new(
            account.uuid,
            SwapDirection::HomeToForeign,
            Amount::Base(100),
            "txhash1".to_string(),
        );
        store.insert_swap(&swap).await.unwrap();

        let unknown = Uuid::new_v4();
        let result = store
            .mark_swaps_settled(&[swap.uuid, unknown], &["hash1".to_string()])
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        // The known swap stayed pending
        let swaps = store.get_swaps_for_account(account.uuid).await.unwrap();
        assert_eq!(swaps[0].status, SwapStatus::Pending);
    }
}
