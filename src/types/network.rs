//! Bridged Network Identifiers
//!
//! The bridge spans exactly two networks:
//! - **Home** - the asset ledger where the bridged token exists as a tagged
//!   asset. Payouts on home carry the configured asset tag and deduct no fee.
//! - **Foreign** - the coin chain. Payouts on foreign deduct the configured
//!   withdrawal fee to fund the transaction.

use serde::{Deserialize, Serialize};

use crate::common::error::BridgeError;

/// One of the two networks the bridge operates across
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Home,
    Foreign,
}

impl Network {
    /// The other network of the pair
    ///
    /// A user receiving on one network always deposits on the other.
    pub fn opposite(&self) -> Network {
        match self {
            Network::Home => Network::Foreign,
            Network::Foreign => Network::Home,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Home => "home",
            Self::Foreign => "foreign",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Network {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "foreign" => Ok(Self::Foreign),
            _ => Err(BridgeError::Validation(format!("unknown network: {}", s))),
        }
    }
}
