//! Batch Settlement Orchestrator
//!
//! The periodic job that settles pending swaps: selects all pending swaps of
//! one direction, aggregates them into one output per destination address,
//! dispatches the batch, and durably marks the settled swaps with the
//! resulting transaction hashes.
//!
//! The batch is the retry unit: a failed dispatch mutates nothing and the
//! next run retries the same selection. Settlement is at-least-once. The one
//! known crash window is a process death after a successful dispatch but
//! before the write-back commits; the next run would then re-select and
//! re-pay the same swaps. Closing it requires reserving the swap set before
//! dispatch and reconciling against the destination network's own history.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::aggregator::{aggregate, AggregatedOutput};
use super::dispatcher::SettlementDispatcher;
use crate::common::error::BridgeError;
use crate::storage::LedgerStore;
use crate::types::swap::SwapDirection;

/// Result of one settlement run for one direction
#[derive(Debug, Default)]
pub struct SettlementReport {
    /// Run skipped because another run of the same direction holds the lock
    pub skipped: bool,
    /// Pending swaps selected for the batch
    pub swaps_selected: usize,
    /// Aggregated outputs dropped by the fee floor rule
    pub outputs_dropped: usize,
    /// Swaps durably marked settled
    pub swaps_settled: usize,
    /// Destination transaction hashes of the dispatched batch
    pub tx_hashes: Vec<String>,
}

impl SettlementReport {
    pub fn has_activity(&self) -> bool {
        self.swaps_selected > 0 || self.outputs_dropped > 0 || self.swaps_settled > 0
    }
}

impl std::fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "selected: {}, dropped: {}, settled: {}, transactions: {}",
            self.swaps_selected,
            self.outputs_dropped,
            self.swaps_settled,
            self.tx_hashes.len()
        )
    }
}

/// Runs the settlement pipeline per direction
pub struct SettlementOrchestrator {
    store: Arc<dyn LedgerStore>,
    dispatcher: SettlementDispatcher,
    poll_interval: Duration,
    // Per-direction mutual exclusion: two runs of the same direction would
    // select overlapping pending sets and double-pay. Different directions
    // touch disjoint pools and run freely in parallel.
    home_to_foreign_lock: Mutex<()>,
    foreign_to_home_lock: Mutex<()>,
}

impl SettlementOrchestrator {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        dispatcher: SettlementDispatcher,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            poll_interval,
            home_to_foreign_lock: Mutex::new(()),
            foreign_to_home_lock: Mutex::new(()),
        }
    }

    fn lock_for(&self, direction: SwapDirection) -> &Mutex<()> {
        match direction {
            SwapDirection::HomeToForeign => &self.home_to_foreign_lock,
            SwapDirection::ForeignToHome => &self.foreign_to_home_lock,
        }
    }

    /// Settle all pending swaps of one direction
    ///
    /// A run already in flight for the same direction causes this one to be
    /// skipped; the next scheduled tick picks the work up again.
    pub async fn process_direction(
        &self,
        direction: SwapDirection,
    ) -> Result<SettlementReport, BridgeError> {
        let _guard = match self.lock_for(direction).try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!(direction = %direction, "settlement run already in flight, skipping");
                return Ok(SettlementReport {
                    skipped: true,
                    ..Default::default()
                });
            }
        };

        let payouts = self.store.pending_payouts(direction).await?;
        let mut report = SettlementReport {
            swaps_selected: payouts.len(),
            ..Default::default()
        };
        if payouts.is_empty() {
            return Ok(report);
        }

        let outputs = aggregate(&payouts);

        // Floor rule: an output that would go non-positive after the fee is
        // dropped from the batch and its swaps stay pending for operator
        // attention. The rest of the batch proceeds.
        let fee = self.dispatcher.fee_base_units(direction);
        let (fundable, underfunded): (Vec<AggregatedOutput>, Vec<AggregatedOutput>) =
            outputs.into_iter().partition(|out| out.amount > fee);

        for out in &underfunded {
            warn!(
                direction = %direction,
                address = %out.address,
                amount = out.amount,
                fee,
                "aggregated payout does not cover the withdrawal fee, leaving pending"
            );
        }
        report.outputs_dropped = underfunded.len();

        if fundable.is_empty() {
            return Ok(report);
        }

        // A dispatch failure propagates here with no swap mutated; the whole
        // batch stays pending and the next run retries it.
        let tx_hashes = self.dispatcher.dispatch(direction, &fundable).await?;

        let paid_addresses: HashSet<&str> =
            fundable.iter().map(|out| out.address.as_str()).collect();
        let settled_uuids: Vec<Uuid> = payouts
            .iter()
            .filter(|p| paid_addresses.contains(p.destination_address.as_str()))
            .map(|p| p.swap_uuid)
            .collect();

        // Crash window: a death between the dispatch above and this commit
        // leaves the batch pending and re-payable on the next run.
        self.store
            .mark_swaps_settled(&settled_uuids, &tx_hashes)
            .await?;

        report.swaps_settled = settled_uuids.len();
        report.tx_hashes = tx_hashes;

        info!(
            direction = %direction,
            settled = report.swaps_settled,
            transactions = report.tx_hashes.len(),
            "settlement run complete"
        );

        Ok(report)
    }

    /// Run the settlement loop, processing both directions each tick
    ///
    /// The two directions run concurrently; per-direction errors are logged
    /// and never abort the loop.
    pub async fn run(&self) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "settlement orchestrator started"
        );

        loop {
            let (home_to_foreign, foreign_to_home) = tokio::join!(
                self.process_direction(SwapDirection::HomeToForeign),
                self.process_direction(SwapDirection::ForeignToHome),
            );

            for (direction, result) in [
                (SwapDirection::HomeToForeign, home_to_foreign),
                (SwapDirection::ForeignToHome, foreign_to_home),
            ] {
                match result {
                    Ok(report) if report.has_activity() => {
                        info!(direction = %direction, "{}", report);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(
                            direction = %direction,
                            retryable = e.is_retryable(),
                            "settlement run failed: {}",
                            e
                        );
                    }
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
