//! Network Chain Clients
//!
//! Capability interface for the two bridged networks. Each network
//! implements the same three capabilities:
//! - mint a fresh deposit address
//! - list confirmed incoming transactions to an address
//! - submit a multi-output send
//!
//! Concrete clients:
//! - `HomeLedgerClient` - JSON-RPC style endpoint (home asset ledger)
//! - `ForeignChainClient` - REST style endpoint (foreign coin chain)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::common::error::BridgeError;
use crate::types::network::Network;

pub mod foreign;
pub mod home;

pub use foreign::ForeignChainClient;
pub use home::HomeLedgerClient;

/// Chain client errors
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;

/// A freshly minted deposit address with its key material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintedAddress {
    pub address: String,
    pub secret: String,
}

/// A confirmed incoming transaction to a watched address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingTransaction {
    /// Source-network transaction hash
    pub hash: String,
    /// Received amount in base units
    pub amount: u64,
}

/// One entry of a multi-output send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOutput {
    pub address: String,
    /// Amount in base units
    pub amount: u64,
    /// Denomination tag, required on the asset ledger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

/// Capabilities each bridged network exposes
///
/// Implementations:
/// - `HomeLedgerClient` - home asset ledger
/// - `ForeignChainClient` - foreign coin chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Mint a fresh deposit address
    async fn mint_address(&self) -> ChainResult<MintedAddress>;

    /// List confirmed incoming transactions to an address
    async fn incoming_transactions(&self, address: &str) -> ChainResult<Vec<IncomingTransaction>>;

    /// Submit a multi-output send
    ///
    /// The network may split one logical batch into multiple physical
    /// transactions; the full ordered hash list is returned.
    async fn multi_send(&self, outputs: &[PaymentOutput]) -> ChainResult<Vec<String>>;
}

impl std::fmt::Debug for dyn ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChainClient")
    }
}

/// Registry of the configured chain clients
///
/// Either side may be left unconfigured (e.g., a settlement worker for one
/// direction only); operations needing the missing client fail with
/// `ChainUnavailable`.
#[derive(Default, Clone)]
pub struct ChainRegistry {
    home: Option<Arc<dyn ChainClient>>,
    foreign: Option<Arc<dyn ChainClient>>,
}

impl ChainRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the home ledger client
    pub fn with_home(mut self, client: Arc<dyn ChainClient>) -> Self {
        self.home = Some(client);
        self
    }

    /// Register the foreign chain client
    pub fn with_foreign(mut self, client: Arc<dyn ChainClient>) -> Self {
        self.foreign = Some(client);
        self
    }

    /// Get the client for a network
    pub fn client(&self, network: Network) -> Result<Arc<dyn ChainClient>, BridgeError> {
        match network {
            Network::Home => self.home.clone(),
            Network::Foreign => self.foreign.clone(),
        }
        .ok_or(BridgeError::ChainUnavailable(network))
    }
}
