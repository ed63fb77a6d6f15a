//! Client Account Types
//!
//! A client account pairs a user's destination address with the
//! bridge-controlled deposit address issued for it on the opposite network.
//! Created on first swap request for a (user address, network) pair;
//! never mutated, never deleted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::network::Network;

/// Pairing between a user's destination address and a deposit address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAccount {
    /// Unique account identity
    pub uuid: Uuid,
    /// Address the user receives payouts on
    pub user_address: String,
    /// Network of `user_address`
    pub user_address_network: Network,
    /// Bridge-controlled address the user deposits to
    pub deposit_address: String,
    /// Network of `deposit_address` (always the opposite of the user's)
    pub deposit_address_network: Network,
    /// Key material for the deposit address.
    /// Owned exclusively by the bridge; never returned to callers.
    #[serde(skip_serializing)]
    pub deposit_secret: String,
    /// Unix timestamp when the account was created
    pub created_at: i64,
}

impl ClientAccount {
    /// Create a new account for a freshly minted deposit address
    pub fn new(
        user_address: String,
        user_address_network: Network,
        deposit_address: String,
        deposit_secret: String,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            deposit_address_network: user_address_network.opposite(),
            user_address,
            user_address_network,
            deposit_address,
            deposit_secret,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Direction of swaps deposited through this account
    pub fn swap_direction(&self) -> crate::types::swap::SwapDirection {
        match self.deposit_address_network {
            Network::Home => crate::types::swap::SwapDirection::HomeToForeign,
            Network::Foreign => crate::types::swap::SwapDirection::ForeignToHome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::swap::SwapDirection;

    #[test]
    fn test_deposit_network_is_opposite() {
        let account = ClientAccount::new(
            "user1".to_string(),
            Network::Foreign,
            "dep1".to_string(),
            "secret".to_string(),
        );
        assert_eq!(account.deposit_address_network, Network::Home);
        assert_eq!(account.swap_direction(), SwapDirection::HomeToForeign);
    }

    #[test]
    fn test_secret_never_serialized() {
        let account = ClientAccount::new(
            "user1".to_string(),
            Network::Home,
            "dep1".to_string(),
            "super-secret".to_string(),
        );
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(!json.contains("deposit_secret"));
    }
}
