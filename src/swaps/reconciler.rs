//! Deposit Reconciler
//!
//! Detects newly confirmed incoming transactions to an account's deposit
//! address and records them as pending swaps, deduplicated by the source
//! transaction hash.
//!
//! Settlement is deliberately not triggered here: a retried finalize call
//! can only repeat detection, which the deposit_tx_hash uniqueness
//! constraint makes harmless. Payout happens out of band in the batch
//! settlement orchestrator.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chains::ChainRegistry;
use crate::common::error::BridgeError;
use crate::storage::{LedgerStore, StorageError};
use crate::types::swap::{Amount, Swap};

/// Reconciles observed deposits into the swap ledger
#[derive(Clone)]
pub struct DepositReconciler {
    store: Arc<dyn LedgerStore>,
    chains: Arc<ChainRegistry>,
}

impl DepositReconciler {
    pub fn new(store: Arc<dyn LedgerStore>, chains: Arc<ChainRegistry>) -> Self {
        Self { store, chains }
    }

    /// Record any deposits to the account's deposit address that are not
    /// yet in the ledger. Returns only the newly created swaps.
    ///
    /// Fails with `NotFound` for an unknown account, `NoDeposit` when the
    /// address has never received anything, and `NoNewDeposit` when every
    /// observed deposit is already recorded.
    pub async fn reconcile(&self, account_uuid: Uuid) -> Result<Vec<Swap>, BridgeError> {
        let account = self
            .store
            .get_account(account_uuid)
            .await?
            .ok_or_else(|| BridgeError::not_found(format!("account {}", account_uuid)))?;

        let client = self.chains.client(account.deposit_address_network)?;

        let (incoming, existing) = tokio::try_join!(
            async {
                client
                    .incoming_transactions(&account.deposit_address)
                    .await
                    .map_err(BridgeError::from)
            },
            async {
                self.store
                    .get_swaps_for_account(account_uuid)
                    .await
                    .map_err(BridgeError::from)
            },
        )?;

        if incoming.is_empty() {
            return Err(BridgeError::NoDeposit);
        }

        // The transaction hash, not the amount, is the dedup key.
        let seen: HashSet<&str> = existing.iter().map(|s| s.deposit_tx_hash.as_str()).collect();
        let new_deposits: Vec<_> = incoming
            .into_iter()
            .filter(|tx| !seen.contains(tx.hash.as_str()))
            .collect();

        if new_deposits.is_empty() {
            return Err(BridgeError::NoNewDeposit);
        }

        let direction = account.swap_direction();
        let mut created = Vec::new();
        for tx in new_deposits {
            let swap = Swap::new(
                account_uuid,
                direction,
                Amount::Base(tx.amount),
                tx.hash.clone(),
            );

            match self.store.insert_swap(&swap).await {
                Ok(()) => {
                    info!(
                        swap = %swap.uuid,
                        account = %account_uuid,
                        deposit_tx = %swap.deposit_tx_hash,
                        amount = tx.amount,
                        direction = %direction,
                        "recorded new deposit"
                    );
                    created.push(swap);
                }
                // A concurrent finalize recorded it first.
                Err(StorageError::Duplicate(_)) => {
                    warn!(
                        account = %account_uuid,
                        deposit_tx = %tx.hash,
                        "deposit already recorded by a concurrent reconcile"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        if created.is_empty() {
            return Err(BridgeError::NoNewDeposit);
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{IncomingTransaction, MockChainClient};
    use crate::storage::{AccountStore, MemoryLedgerStore, SwapStore};
    use crate::types::account::ClientAccount;
    use crate::types::network::Network;
    use crate::types::swap::SwapStatus;

    async fn seeded_account(store: &MemoryLedgerStore) -> ClientAccount {
        let account = ClientAccount::new(
            "foreign_user".to_string(),
            Network::Foreign,
            "home_dep_1".to_string(),
            "secret".to_string(),
        );
        store.insert_account(&account).await.unwrap();
        account
    }

    fn reconciler_with(
        store: Arc<MemoryLedgerStore>,
        client: MockChainClient,
    ) -> DepositReconciler {
        let chains = Arc::new(ChainRegistry::new().with_home(Arc::new(client)));
        DepositReconciler::new(store, chains)
    }

    fn listing_client(txs: Vec<IncomingTransaction>) -> MockChainClient {
        let mut client = MockChainClient::new();
        client
            .expect_incoming_transactions()
            .returning(move |_| Ok(txs.clone()));
        client
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let store = Arc::new(MemoryLedgerStore::new());
        let reconciler = reconciler_with(store, MockChainClient::new());

        let err = reconciler.reconcile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_address_is_no_deposit() {
        let store = Arc::new(MemoryLedgerStore::new());
        let account = seeded_account(&store).await;
        let reconciler = reconciler_with(store, listing_client(vec![]));

        let err = reconciler.reconcile(account.uuid).await.unwrap_err();
        assert!(matches!(err, BridgeError::NoDeposit));
    }

    #[tokio::test]
    async fn test_new_deposits_recorded_pending() {
        let store = Arc::new(MemoryLedgerStore::new());
        let account = seeded_account(&store).await;
        let reconciler = reconciler_with(
            store.clone(),
            listing_client(vec![
                IncomingTransaction {
                    hash: "txhash1".to_string(),
                    amount: 10_000_000_000,
                },
                IncomingTransaction {
                    hash: "txhash2".to_string(),
                    amount: 5_000_000_000,
                },
            ]),
        );

        let created = reconciler.reconcile(account.uuid).await.unwrap();
        assert_eq!(created.len(), 2);
        assert!(created
            .iter()
            .all(|s| s.status == SwapStatus::Pending && s.transfer_tx_hashes.is_empty()));

        let stored = store.get_swaps_for_account(account.uuid).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_finalize_dedups_by_hash() {
        let store = Arc::new(MemoryLedgerStore::new());
        let account = seeded_account(&store).await;
        let reconciler = reconciler_with(
            store.clone(),
            listing_client(vec![IncomingTransaction {
                hash: "txhash1".to_string(),
                amount: 10_000_000_000,
            }]),
        );

        reconciler.reconcile(account.uuid).await.unwrap();

        // Same deposit set again: nothing new, nothing duplicated.
        let err = reconciler.reconcile(account.uuid).await.unwrap_err();
        assert!(matches!(err, BridgeError::NoNewDeposit));

        let stored = store.get_swaps_for_account(account.uuid).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_deposit_sets_record_only_new() {
        let store = Arc::new(MemoryLedgerStore::new());
        let account = seeded_account(&store).await;

        let first = reconciler_with(
            store.clone(),
            listing_client(vec![IncomingTransaction {
                hash: "txhash1".to_string(),
                amount: 100,
            }]),
        );
        first.reconcile(account.uuid).await.unwrap();

        // A second observation includes the old deposit and a new one; only
        // the new hash survives even though the amounts match.
        let second = reconciler_with(
            store.clone(),
            listing_client(vec![
                IncomingTransaction {
                    hash: "txhash1".to_string(),
                    amount: 100,
                },
                IncomingTransaction {
                    hash: "txhash2".to_string(),
                    amount: 100,
                },
            ]),
        );
        let created = second.reconcile(account.uuid).await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].deposit_tx_hash, "txhash2");

        let stored = store.get_swaps_for_account(account.uuid).await.unwrap();
        assert_eq!(stored.len(), 2);
    }
}
