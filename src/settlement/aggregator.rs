//! Payout Aggregator
//!
//! Collapses a batch of pending swaps into one output per destination
//! address, so N deposits to the same recipient cost one destination-network
//! transaction instead of N.

use std::collections::HashMap;

use crate::types::swap::{Amount, PendingPayout};

/// One aggregated payout entry, never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedOutput {
    pub address: String,
    /// Summed amount in base units
    pub amount: f64,
}

/// Resolve an amount to a number of base units.
///
/// Fallback rule: a legacy value that cannot be parsed as a number
/// contributes 0 to its group. One malformed record must not block the
/// unrelated swaps in the same batch.
pub fn parse_amount(amount: &Amount) -> f64 {
    match amount {
        Amount::Base(n) => *n as f64,
        Amount::Legacy(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    }
}

/// Group payouts by destination address and sum their amounts
///
/// Emits one output per distinct address, in first-seen order.
pub fn aggregate(payouts: &[PendingPayout]) -> Vec<AggregatedOutput> {
    let mut outputs: Vec<AggregatedOutput> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for payout in payouts {
        let amount = parse_amount(&payout.amount);
        match index.get(payout.destination_address.as_str()) {
            Some(&i) => outputs[i].amount += amount,
            None => {
                index.insert(payout.destination_address.as_str(), outputs.len());
                outputs.push(AggregatedOutput {
                    address: payout.destination_address.clone(),
                    amount,
                });
            }
        }
    }

    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn payout(address: &str, amount: Amount) -> PendingPayout {
        PendingPayout {
            swap_uuid: Uuid::new_v4(),
            destination_address: address.to_string(),
            amount,
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&Amount::Base(20)), 20.0);
        assert_eq!(parse_amount(&Amount::Legacy("10".to_string())), 10.0);
        assert_eq!(
            parse_amount(&Amount::Legacy("12.3456789".to_string())),
            12.3456789
        );
        assert_eq!(parse_amount(&Amount::Legacy("invalid".to_string())), 0.0);
        assert_eq!(parse_amount(&Amount::Legacy(" 15 ".to_string())), 15.0);
    }

    #[test]
    fn test_aggregation_groups_and_sums() {
        let payouts = vec![
            payout("1", Amount::Legacy("10".to_string())),
            payout("1", Amount::Base(20)),
            payout("2", Amount::Legacy("15".to_string())),
        ];

        let outputs = aggregate(&payouts);
        assert_eq!(
            outputs,
            vec![
                AggregatedOutput {
                    address: "1".to_string(),
                    amount: 30.0
                },
                AggregatedOutput {
                    address: "2".to_string(),
                    amount: 15.0
                },
            ]
        );
    }

    #[test]
    fn test_malformed_record_contributes_zero() {
        let payouts = vec![
            payout("1", Amount::Legacy("invalid".to_string())),
            payout("1", Amount::Base(20)),
            payout("2", Amount::Base(15)),
        ];

        let outputs = aggregate(&payouts);
        assert_eq!(outputs[0].amount, 20.0);
        assert_eq!(outputs[1].amount, 15.0);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let payouts = vec![
            payout("c", Amount::Base(1)),
            payout("a", Amount::Base(2)),
            payout("c", Amount::Base(3)),
            payout("b", Amount::Base(4)),
        ];

        let addresses: Vec<_> = aggregate(&payouts).into_iter().map(|o| o.address).collect();
        assert_eq!(addresses, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(aggregate(&[]).is_empty());
    }
}
