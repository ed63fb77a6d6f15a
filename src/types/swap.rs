//! Swap Types
//!
//! Types for the swap lifecycle: a deposit detected on one network and its
//! eventual batched payout on the other.
//!
//! Lifecycle: pending → settled. A swap is created by the deposit reconciler
//! when a new incoming transaction is observed, and mutated exactly once by
//! the settlement orchestrator when the batch it belongs to is paid out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::network::Network;
use crate::common::error::BridgeError;

/// Which of the two swap flows a swap belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// Deposit on home, payout on foreign (fee-bearing leg)
    HomeToForeign,
    /// Deposit on foreign, payout on home (asset-tagged leg)
    ForeignToHome,
}

impl SwapDirection {
    /// Network the user deposits on
    pub fn deposit_network(&self) -> Network {
        match self {
            Self::HomeToForeign => Network::Home,
            Self::ForeignToHome => Network::Foreign,
        }
    }

    /// Network the payout is dispatched on
    pub fn destination_network(&self) -> Network {
        self.deposit_network().opposite()
    }
}

impl std::fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HomeToForeign => "home_to_foreign",
            Self::ForeignToHome => "foreign_to_home",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SwapDirection {
    type Err = BridgeError;

    /// Parse a direction from its wire/storage form.
    ///
    /// The enum is closed, so out-of-range direction values can only exist
    /// at string boundaries (API input, storage rows). They are rejected
    /// here, before any network call can happen.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home_to_foreign" => Ok(Self::HomeToForeign),
            "foreign_to_home" => Ok(Self::ForeignToHome),
            _ => Err(BridgeError::InvalidSwapType(s.to_string())),
        }
    }
}

/// Status of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    /// Deposit recorded, payout not yet dispatched
    Pending,
    /// Paid out, transfer hashes recorded
    Settled,
}

impl Default for SwapStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SwapStatus {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            _ => Err(BridgeError::Validation(format!("unknown swap status: {}", s))),
        }
    }
}

/// A swap amount in base units
///
/// The normal path is an integer number of base units. Older ledger exports
/// wrote amounts as decimal strings, so the legacy form is kept representable
/// and resolved permissively at aggregation time (see
/// `settlement::aggregator::parse_amount`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Base(u64),
    Legacy(String),
}

impl Amount {
    /// Storage/wire text form
    pub fn as_text(&self) -> String {
        match self {
            Self::Base(n) => n.to_string(),
            Self::Legacy(s) => s.clone(),
        }
    }

    /// Parse the storage text form back into an amount
    ///
    /// Anything that is not a plain integer is kept as a legacy string;
    /// interpretation is deferred to aggregation.
    pub fn from_text(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => Self::Base(n),
            Err(_) => Self::Legacy(s.to_string()),
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// One detected deposit and its eventual payout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swap {
    /// Unique swap identity
    pub uuid: Uuid,
    /// Owning client account
    pub account_uuid: Uuid,
    /// Swap flow this deposit belongs to
    pub direction: SwapDirection,
    /// Deposited amount in base units
    pub amount: Amount,
    /// Source-network transaction hash of the deposit.
    /// Globally unique: the sole deduplication key.
    pub deposit_tx_hash: String,
    /// Destination-network transaction hashes of the payout.
    /// Empty until settled; set exactly once, atomically with the
    /// transition to `Settled`.
    pub transfer_tx_hashes: Vec<String>,
    /// Current status
    pub status: SwapStatus,
    /// Unix timestamp when the deposit was recorded
    pub created_at: i64,
}

impl Swap {
    /// Create a new pending swap for a detected deposit
    pub fn new(
        account_uuid: Uuid,
        direction: SwapDirection,
        amount: Amount,
        deposit_tx_hash: String,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            account_uuid,
            direction,
            amount,
            deposit_tx_hash,
            transfer_tx_hashes: Vec::new(),
            status: SwapStatus::Pending,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Read model for the settlement query
///
/// A swap row does not carry the address to be paid; this joins a pending
/// swap with its owning account's address on the settlement network.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPayout {
    pub swap_uuid: Uuid,
    pub destination_address: String,
    pub amount: Amount,
}
