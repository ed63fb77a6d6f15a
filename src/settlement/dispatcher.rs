//! Settlement Dispatcher
//!
//! Submits aggregated outputs as a batched payout on the destination
//! network of a swap direction:
//! - payouts on home carry the configured asset tag and deduct no fee
//!   (home transaction costs are funded by the operator out of band)
//! - payouts on foreign deduct the configured withdrawal fee from every
//!   output to fund the foreign transaction

use std::sync::Arc;
use tracing::info;

use super::aggregator::AggregatedOutput;
use crate::chains::{ChainRegistry, PaymentOutput};
use crate::common::error::BridgeError;
use crate::types::network::Network;
use crate::types::swap::SwapDirection;
use crate::types::units;

/// Fee and denomination parameters for dispatch
///
/// Passed in explicitly so direction-specific behavior is testable in
/// isolation; nothing here reads ambient state.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Denomination tag attached to every multi-send entry on home
    pub home_asset: String,
    /// Withdrawal fee in whole coins, deducted per output on foreign
    pub withdrawal_fee_coins: f64,
}

impl DispatchConfig {
    /// Fee deducted per output for a direction, in base units
    pub fn fee_base_units(&self, direction: SwapDirection) -> f64 {
        match direction.destination_network() {
            Network::Foreign => units::coins_to_base(self.withdrawal_fee_coins) as f64,
            Network::Home => 0.0,
        }
    }
}

/// Dispatches aggregated payouts to the destination network
#[derive(Clone)]
pub struct SettlementDispatcher {
    chains: Arc<ChainRegistry>,
    config: DispatchConfig,
}

impl SettlementDispatcher {
    pub fn new(chains: Arc<ChainRegistry>, config: DispatchConfig) -> Self {
        Self { chains, config }
    }

    /// Fee deducted per output for a direction, in base units
    pub fn fee_base_units(&self, direction: SwapDirection) -> f64 {
        self.config.fee_base_units(direction)
    }

    /// Submit the aggregated outputs as one batched payout
    ///
    /// Returns the full ordered list of resulting transaction hashes; the
    /// destination network may split one logical batch into several physical
    /// transactions, so callers must not assume one hash per output.
    ///
    /// Non-positive post-fee amounts must be filtered by the caller before
    /// dispatch (see the orchestrator's floor rule).
    pub async fn dispatch(
        &self,
        direction: SwapDirection,
        outputs: &[AggregatedOutput],
    ) -> Result<Vec<String>, BridgeError> {
        if outputs.is_empty() {
            return Ok(Vec::new());
        }

        let destination = direction.destination_network();
        let client = self.chains.client(destination)?;

        let fee = self.fee_base_units(direction);
        let asset = match destination {
            Network::Home => Some(self.config.home_asset.clone()),
            Network::Foreign => None,
        };

        let entries: Vec<PaymentOutput> = outputs
            .iter()
            .map(|out| PaymentOutput {
                address: out.address.clone(),
                amount: (out.amount - fee).round() as u64,
                asset: asset.clone(),
            })
            .collect();

        let hashes = client
            .multi_send(&entries)
            .await
            .map_err(BridgeError::Dispatch)?;

        info!(
            direction = %direction,
            outputs = entries.len(),
            transactions = hashes.len(),
            "dispatched batched payout"
        );

        Ok(hashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::MockChainClient;
    use crate::types::units::coins_to_base;

    fn outputs(entries: &[(&str, f64)]) -> Vec<AggregatedOutput> {
        entries
            .iter()
            .map(|(address, amount)| AggregatedOutput {
                address: address.to_string(),
                amount: *amount,
            })
            .collect()
    }

    fn dispatcher_with_foreign(client: MockChainClient, fee: f64) -> SettlementDispatcher {
        SettlementDispatcher::new(
            Arc::new(ChainRegistry::new().with_foreign(Arc::new(client))),
            DispatchConfig {
                home_asset: "BRIDGE".to_string(),
                withdrawal_fee_coins: fee,
            },
        )
    }

    #[tokio::test]
    async fn test_foreign_payout_deducts_fee_exactly() {
        let mut client = MockChainClient::new();
        client
            .expect_multi_send()
            .withf(|entries: &[PaymentOutput]| {
                entries.len() == 2
                    && entries[0].amount == 10_000_000_000 - coins_to_base(0.5)
                    && entries[1].amount == 4_000_000_000 - coins_to_base(0.5)
                    && entries.iter().all(|e| e.asset.is_none())
            })
            .times(1)
            .returning(|_| Ok(vec!["hash1".to_string()]));

        let dispatcher = dispatcher_with_foreign(client, 0.5);
        let hashes = dispatcher
            .dispatch(
                SwapDirection::HomeToForeign,
                &outputs(&[("addr1", 10_000_000_000.0), ("addr2", 4_000_000_000.0)]),
            )
            .await
            .unwrap();
        assert_eq!(hashes, vec!["hash1"]);
    }

    #[tokio::test]
    async fn test_home_payout_tags_asset_and_keeps_full_amount() {
        let mut client = MockChainClient::new();
        client
            .expect_multi_send()
            .withf(|entries: &[PaymentOutput]| {
                entries.len() == 1
                    && entries[0].amount == 10_000_000_000
                    && entries[0].asset.as_deref() == Some("BRIDGE")
            })
            .times(1)
            .returning(|_| Ok(vec!["hash1".to_string(), "hash2".to_string()]));

        let dispatcher = SettlementDispatcher::new(
            Arc::new(ChainRegistry::new().with_home(Arc::new(client))),
            DispatchConfig {
                home_asset: "BRIDGE".to_string(),
                withdrawal_fee_coins: 0.5,
            },
        );

        // Withdrawal fee applies to the foreign leg only.
        let hashes = dispatcher
            .dispatch(
                SwapDirection::ForeignToHome,
                &outputs(&[("home_addr", 10_000_000_000.0)]),
            )
            .await
            .unwrap();
        assert_eq!(hashes, vec!["hash1", "hash2"]);
    }

    #[tokio::test]
    async fn test_missing_client_fails_before_any_call() {
        let dispatcher = SettlementDispatcher::new(
            Arc::new(ChainRegistry::new()),
            DispatchConfig {
                home_asset: "BRIDGE".to_string(),
                withdrawal_fee_coins: 0.0,
            },
        );

        let err = dispatcher
            .dispatch(SwapDirection::HomeToForeign, &outputs(&[("addr1", 100.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ChainUnavailable(Network::Foreign)));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_call() {
        // A mock with no expectations panics on any call.
        let dispatcher = dispatcher_with_foreign(MockChainClient::new(), 0.0);
        let hashes = dispatcher
            .dispatch(SwapDirection::HomeToForeign, &[])
            .await
            .unwrap();
        assert!(hashes.is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_is_dispatch_error() {
        let mut client = MockChainClient::new();
        client.expect_multi_send().returning(|_| {
            Err(crate::chains::ChainError::Protocol("node down".to_string()))
        });

        let dispatcher = dispatcher_with_foreign(client, 0.0);
        let err = dispatcher
            .dispatch(SwapDirection::HomeToForeign, &outputs(&[("addr1", 100.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Dispatch(_)));
        assert!(err.is_retryable());
    }
}
