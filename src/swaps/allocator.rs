//! Account Allocator
//!
//! Idempotently maps a user's destination address to a deposit address on
//! the opposite network. Repeated calls with identical input return the same
//! account and write nothing, so callers can retry safely.

use std::sync::Arc;
use tracing::{debug, info};

use crate::chains::ChainRegistry;
use crate::common::error::BridgeError;
use crate::storage::{LedgerStore, StorageError};
use crate::types::account::ClientAccount;
use crate::types::network::Network;

/// Allocates deposit accounts against the ledger
#[derive(Clone)]
pub struct AccountAllocator {
    store: Arc<dyn LedgerStore>,
    chains: Arc<ChainRegistry>,
}

impl AccountAllocator {
    pub fn new(store: Arc<dyn LedgerStore>, chains: Arc<ChainRegistry>) -> Self {
        Self { store, chains }
    }

    /// Get the existing account for (user_address, user_network) or create
    /// one with a freshly minted deposit address on the opposite network.
    ///
    /// The unique constraint on the pair is the authoritative guard against
    /// the check-then-insert race: when a concurrent request wins the insert,
    /// this re-reads and returns the surviving row. The loser's minted
    /// address is discarded.
    pub async fn get_or_create_deposit_account(
        &self,
        user_address: &str,
        user_network: Network,
    ) -> Result<ClientAccount, BridgeError> {
        if let Some(existing) = self
            .store
            .get_account_by_user(user_address, user_network)
            .await?
        {
            debug!(
                account = %existing.uuid,
                user_address,
                "returning existing deposit account"
            );
            return Ok(existing);
        }

        let deposit_network = user_network.opposite();
        let client = self
            .chains
            .client(deposit_network)
            .map_err(|e| BridgeError::AccountCreation(e.to_string()))?;

        let minted = client
            .mint_address()
            .await
            .map_err(|e| BridgeError::AccountCreation(e.to_string()))?;

        let account = ClientAccount::new(
            user_address.to_string(),
            user_network,
            minted.address,
            minted.secret,
        );

        match self.store.insert_account(&account).await {
            Ok(()) => {
                info!(
                    account = %account.uuid,
                    user_address,
                    user_network = %user_network,
                    deposit_address = %account.deposit_address,
                    "allocated deposit account"
                );
                Ok(account)
            }
            Err(StorageError::Duplicate(_)) => self
                .store
                .get_account_by_user(user_address, user_network)
                .await?
                .ok_or_else(|| {
                    BridgeError::internal(format!(
                        "account for {} on {} vanished after duplicate insert",
                        user_address, user_network
                    ))
                }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{MintedAddress, MockChainClient};
    use crate::storage::{AccountStore, MemoryLedgerStore};

    fn minting_client(address: &str) -> MockChainClient {
        let address = address.to_string();
        let mut client = MockChainClient::new();
        client.expect_mint_address().returning(move || {
            Ok(MintedAddress {
                address: address.clone(),
                secret: "secret".to_string(),
            })
        });
        client
    }

    fn allocator_with(client: MockChainClient) -> (AccountAllocator, Arc<MemoryLedgerStore>) {
        let store = Arc::new(MemoryLedgerStore::new());
        let chains = Arc::new(ChainRegistry::new().with_home(Arc::new(client)));
        (
            AccountAllocator::new(store.clone(), chains),
            store,
        )
    }

    #[tokio::test]
    async fn test_allocation_is_idempotent() {
        let (allocator, store) = allocator_with(minting_client("home_dep_1"));

        let first = allocator
            .get_or_create_deposit_account("foreign_user", Network::Foreign)
            .await
            .unwrap();
        let second = allocator
            .get_or_create_deposit_account("foreign_user", Network::Foreign)
            .await
            .unwrap();

        assert_eq!(first.uuid, second.uuid);
        assert_eq!(first.deposit_address, "home_dep_1");
        assert_eq!(first.deposit_address_network, Network::Home);
        assert_eq!(store.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_allocation_creates_one_account() {
        let (allocator, store) = allocator_with(minting_client("home_dep_1"));
        let allocator = Arc::new(allocator);

        let a = allocator.clone();
        let b = allocator.clone();
        let (first, second) = tokio::join!(
            a.get_or_create_deposit_account("foreign_user", Network::Foreign),
            b.get_or_create_deposit_account("foreign_user", Network::Foreign),
        );

        assert_eq!(first.unwrap().uuid, second.unwrap().uuid);
        assert_eq!(store.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_client_is_account_creation_error() {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let allocator = AccountAllocator::new(store.clone(), Arc::new(ChainRegistry::new()));

        let err = allocator
            .get_or_create_deposit_account("foreign_user", Network::Foreign)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::AccountCreation(_)));
        assert_eq!(store.count_accounts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mint_failure_writes_nothing() {
        let mut client = MockChainClient::new();
        client.expect_mint_address().returning(|| {
            Err(crate::chains::ChainError::Protocol("minting halted".to_string()))
        });

        let (allocator, store) = allocator_with(client);
        let err = allocator
            .get_or_create_deposit_account("foreign_user", Network::Foreign)
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::AccountCreation(_)));
        assert_eq!(store.count_accounts().await.unwrap(), 0);
    }
}
