//! Treasury reconciliation for the gold ledger.
//!
//! Diplomacy only moves gold; it never creates or destroys it. For a year Y
//! the check is:
//!
//! ```text
//! for every dynasty D:  wealth_after(D) - wealth_before(D) == net_flow(D, Y)
//! sum(wealth_after) == sum(wealth_before)
//! ```
//!
//! A dynasty missing from a snapshot counts as holding zero gold. A
//! violation produces a [`LedgerAnomaly`].

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use concord_types::{DynastyId, LedgerEntry};

use crate::LedgerAnomaly;
use crate::ledger::net_flows;

/// The result of a conservation check for a single year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConservationResult {
    /// Every treasury movement is accounted for.
    Balanced,
    /// One or more treasuries moved without a matching ledger flow.
    Anomaly(LedgerAnomaly),
}

/// Reconcile treasury snapshots against the ledger entries of one year.
pub fn verify_conservation(
    year: u32,
    entries: &[LedgerEntry],
    wealth_before: &BTreeMap<DynastyId, Decimal>,
    wealth_after: &BTreeMap<DynastyId, Decimal>,
) -> ConservationResult {
    let flows = net_flows(year, entries);

    let dynasties: BTreeSet<DynastyId> = wealth_before
        .keys()
        .chain(wealth_after.keys())
        .chain(flows.keys())
        .copied()
        .collect();

    let mut imbalances: BTreeMap<DynastyId, (Decimal, Decimal)> = BTreeMap::new();

    for dynasty in dynasties {
        let before = wealth_before.get(&dynasty).copied().unwrap_or(Decimal::ZERO);
        let after = wealth_after.get(&dynasty).copied().unwrap_or(Decimal::ZERO);
        let flow = flows.get(&dynasty).copied().unwrap_or(Decimal::ZERO);

        let Some(observed) = after.checked_sub(before) else {
            return overflow_anomaly(year, dynasty);
        };
        if observed != flow {
            imbalances.insert(dynasty, (flow, observed));
        }
    }

    if !imbalances.is_empty() {
        let count = imbalances.len();
        return ConservationResult::Anomaly(LedgerAnomaly {
            year,
            imbalances,
            message: format!(
                "LEDGER_ANOMALY in year {year}: {count} treasury change(s) not matched by ledger flows",
            ),
        });
    }

    let total_before = sum(wealth_before.values());
    let total_after = sum(wealth_after.values());
    if total_before != total_after {
        return ConservationResult::Anomaly(LedgerAnomaly {
            year,
            imbalances,
            message: format!(
                "LEDGER_ANOMALY in year {year}: total wealth changed from {total_before} to {total_after}",
            ),
        });
    }

    ConservationResult::Balanced
}

fn sum<'a>(values: impl Iterator<Item = &'a Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
}

/// Construct an anomaly result for arithmetic overflow.
fn overflow_anomaly(year: u32, dynasty: DynastyId) -> ConservationResult {
    let mut imbalances = BTreeMap::new();
    imbalances.insert(dynasty, (Decimal::ZERO, Decimal::ZERO));
    ConservationResult::Anomaly(LedgerAnomaly {
        year,
        imbalances,
        message: format!(
            "LEDGER_ANOMALY in year {year}: arithmetic overflow reconciling {dynasty}",
        ),
    })
}
