//! SQLite Persistent Storage for the Swap Ledger
//!
//! Durable storage for client accounts and swaps that survives service
//! restarts. Uses connection pooling via r2d2 for concurrent access.
//!
//! Uniqueness constraints enforced here are authoritative for the whole
//! system: (user_address, user_address_network) for allocation idempotency
//! and deposit_tx_hash for deposit deduplication.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use super::traits::{AccountStore, StorageError, StorageResult, SwapStore};
use crate::types::account::ClientAccount;
use crate::types::network::Network;
use crate::types::swap::{Amount, PendingPayout, Swap, SwapDirection, SwapStatus};

/// Join transfer hashes into the comma-delimited storage form
///
/// The delimited string exists only at this boundary; the domain model
/// always carries an explicit ordered list.
fn join_hashes(hashes: &[String]) -> String {
    hashes.join(",")
}

/// Split the comma-delimited storage form back into an ordered list
fn split_hashes(s: &str) -> Vec<String> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.split(',').map(str::to_string).collect()
    }
}

fn conversion_err<E>(err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

/// SQLite-backed ledger store with connection pooling
pub struct SqliteLedgerStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteLedgerStore {
    /// Create a new store with the given database path
    ///
    /// Creates the database file and runs migrations if needed.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Get a connection from the pool
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS client_accounts (
                uuid TEXT PRIMARY KEY,
                user_address TEXT NOT NULL,
                user_address_network TEXT NOT NULL,
                deposit_address TEXT NOT NULL,
                deposit_address_network TEXT NOT NULL,
                deposit_secret TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE(user_address, user_address_network)
            );

            CREATE TABLE IF NOT EXISTS swaps (
                uuid TEXT PRIMARY KEY,
                account_uuid TEXT NOT NULL REFERENCES client_accounts(uuid),
                direction TEXT NOT NULL,
                amount TEXT NOT NULL,
                deposit_tx_hash TEXT NOT NULL UNIQUE,
                transfer_tx_hashes TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'pending',
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_swaps_account ON swaps(account_uuid);
            CREATE INDEX IF NOT EXISTS idx_swaps_status_direction ON swaps(status, direction);
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    /// Convert a database row to ClientAccount
    fn row_to_account(row: &rusqlite::Row) -> rusqlite::Result<ClientAccount> {
        let uuid: String = row.get("uuid")?;
        let user_network: String = row.get("user_address_network")?;
        let deposit_network: String = row.get("deposit_address_network")?;

        Ok(ClientAccount {
            uuid: Uuid::parse_str(&uuid).map_err(conversion_err)?,
            user_address: row.get("user_address")?,
            user_address_network: user_network.parse::<Network>().map_err(conversion_err)?,
            deposit_address: row.get("deposit_address")?,
            deposit_address_network: deposit_network.parse::<Network>().map_err(conversion_err)?,
            deposit_secret: row.get("deposit_secret")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Convert a database row to Swap
    fn row_to_swap(row: &rusqlite::Row) -> rusqlite::Result<Swap> {
        let uuid: String = row.get("uuid")?;
        let account_uuid: String = row.get("account_uuid")?;
        let direction: String = row.get("direction")?;
        let amount: String = row.get("amount")?;
        let hashes: String = row.get("transfer_tx_hashes")?;
        let status: String = row.get("status")?;

        Ok(Swap {
            uuid: Uuid::parse_str(&uuid).map_err(conversion_err)?,
            account_uuid: Uuid::parse_str(&account_uuid).map_err(conversion_err)?,
            direction: direction.parse::<SwapDirection>().map_err(conversion_err)?,
            amount: Amount::from_text(&amount),
            deposit_tx_hash: row.get("deposit_tx_hash")?,
            transfer_tx_hashes: split_hashes(&hashes),
            status: status.parse::<SwapStatus>().map_err(conversion_err)?,
            created_at: row.get("created_at")?,
        })
    }

    // Synchronous helper methods for the trait implementations

    fn insert_account_sync(&self, account: &ClientAccount) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO client_accounts (
                uuid, user_address, user_address_network,
                deposit_address, deposit_address_network,
                deposit_secret, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                account.uuid.to_string(),
                account.user_address,
                account.user_address_network.to_string(),
                account.deposit_address,
                account.deposit_address_network.to_string(),
                account.deposit_secret,
                account.created_at,
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.extended_code == 1555 || err.extended_code == 2067 {
                    return StorageError::Duplicate(format!(
                        "account for {} on {}",
                        account.user_address, account.user_address_network
                    ));
                }
            }
            StorageError::Database(e.to_string())
        })?;

        Ok(())
    }

    fn get_account_sync(&self, uuid: Uuid) -> Result<Option<ClientAccount>, StorageError> {
        let conn = self.conn()?;

        let account = conn
            .query_row(
                "SELECT * FROM client_accounts WHERE uuid = ?1",
                params![uuid.to_string()],
                |row| Self::row_to_account(row),
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(account)
    }

    fn get_account_by_user_sync(
        &self,
        user_address: &str,
        user_network: Network,
    ) -> Result<Option<ClientAccount>, StorageError> {
        let conn = self.conn()?;

        let account = conn
            .query_row(
                "SELECT * FROM client_accounts WHERE user_address = ?1 AND user_address_network = ?2",
                params![user_address, user_network.to_string()],
                |row| Self::row_to_account(row),
            )
            .optional()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(account)
    }

    fn count_accounts_sync(&self) -> Result<u64, StorageError> {
        let conn = self.conn()?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM client_accounts", [], |row| row.get(0))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(count as u64)
    }

    fn insert_swap_sync(&self, swap: &Swap) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO swaps (
                uuid, account_uuid, direction, amount,
                deposit_tx_hash, transfer_tx_hashes, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                swap.uuid.to_string(),
                swap.account_uuid.to_string(),
                swap.direction.to_string(),
                swap.amount.as_text(),
                swap.deposit_tx_hash,
                join_hashes(&swap.transfer_tx_hashes),
                swap.status.to_string(),
                swap.created_at,
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.extended_code == 1555 || err.extended_code == 2067 {
                    return StorageError::Duplicate(swap.deposit_tx_hash.clone());
                }
            }
            StorageError::Database(e.to_string())
        })?;

        Ok(())
    }

    fn get_swaps_for_account_sync(&self, account_uuid: Uuid) -> Result<Vec<Swap>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT * FROM swaps WHERE account_uuid = ?1 ORDER BY created_at ASC, uuid ASC")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let swaps = stmt
            .query_map(params![account_uuid.to_string()], |row| Self::row_to_swap(row))
            .map_err(|e| StorageError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(swaps)
    }

    fn pending_payouts_sync(
        &self,
        direction: SwapDirection,
    ) -> Result<Vec<PendingPayout>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                r#"
            SELECT s.uuid, a.user_address, s.amount
            FROM swaps s
            JOIN client_accounts a ON a.uuid = s.account_uuid
            WHERE s.status = 'pending' AND s.direction = ?1
            ORDER BY s.created_at ASC, s.uuid ASC
            "#,
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let payouts = stmt
            .query_map(params![direction.to_string()], |row| {
                let uuid: String = row.get(0)?;
                let address: String = row.get(1)?;
                let amount: String = row.get(2)?;
                Ok(PendingPayout {
                    swap_uuid: Uuid::parse_str(&uuid).map_err(conversion_err)?,
                    destination_address: address,
                    amount: Amount::from_text(&amount),
                })
            })
            .map_err(|e| StorageError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(payouts)
    }

    fn mark_swaps_settled_sync(
        &self,
        uuids: &[Uuid],
        tx_hashes: &[String],
    ) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let joined = join_hashes(tx_hashes);

        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        for uuid in uuids {
            let rows_affected = tx
                .execute(
                    r#"
                UPDATE swaps SET transfer_tx_hashes = ?2, status = 'settled'
                WHERE uuid = ?1 AND status = 'pending'
                "#,
                    params![uuid.to_string(), joined],
                )
                .map_err(|e| StorageError::Database(e.to_string()))?;

            // Dropping the transaction rolls the whole batch back.
            if rows_affected == 0 {
                return Err(StorageError::NotFound(format!("pending swap {}", uuid)));
            }
        }

        tx.commit().map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    fn count_swaps_by_status_sync(&self) -> Result<HashMap<String, u64>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM swaps GROUP BY status")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut counts = HashMap::new();
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        for row in rows {
            let (status, count) = row.map_err(|e| StorageError::Database(e.to_string()))?;
            counts.insert(status, count as u64);
        }

        Ok(counts)
    }
}

#[async_trait]
impl AccountStore for SqliteLedgerStore {
    async fn insert_account(&self, account: &ClientAccount) -> StorageResult<()> {
        self.insert_account_sync(account)
    }

    async fn get_account(&self, uuid: Uuid) -> StorageResult<Option<ClientAccount>> {
        self.get_account_sync(uuid)
    }

    async fn get_account_by_user(
        &self,
        user_address: &str,
        user_network: Network,
    ) -> StorageResult<Option<ClientAccount>> {
        self.get_account_by_user_sync(user_address, user_network)
    }

    async fn count_accounts(&self) -> StorageResult<u64> {
        self.count_accounts_sync()
    }
}

#[async_trait]
impl SwapStore for SqliteLedgerStore {
    async fn insert_swap(&self, swap: &Swap) -> StorageResult<()> {
        self.insert_swap_sync(swap)
    }

    async fn get_swaps_for_account(&self, account_uuid: Uuid) -> StorageResult<Vec<Swap>> {
        self.get_swaps_for_account_sync(account_uuid)
    }

    async fn pending_payouts(&self, direction: SwapDirection) -> StorageResult<Vec<PendingPayout>> {
        self.pending_payouts_sync(direction)
    }

    async fn mark_swaps_settled(&self, uuids: &[Uuid], tx_hashes: &[String]) -> StorageResult<()> {
        self.mark_swaps_settled_sync(uuids, tx_hashes)
    }

    async fn count_swaps_by_status(&self) -> StorageResult<HashMap<String, u64>> {
        self.count_swaps_by_status_sync()
    }
}
