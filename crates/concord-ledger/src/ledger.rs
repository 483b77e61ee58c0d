//! The gold ledger: an append-only log of all diplomatic gold transfers.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Double-entry**: every transfer has a payer (debit) and a payee (credit).
//! - **Precision**: all amounts use [`Decimal`] -- no floating point.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use concord_types::{DynastyId, LedgerEntry, LedgerEntryType, TreatyId, WarId};

use crate::conservation::{ConservationResult, verify_conservation};
use crate::{LedgerError, TransactionBuilder};

/// The append-only log of gold transfers between dynasties.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a pre-built [`LedgerEntry`].
    ///
    /// Used when committing entries staged inside a diplomacy transaction.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        year: u32,
        entry_type: LedgerEntryType,
        payer: DynastyId,
        payee: DynastyId,
        amount: Decimal,
        reason: &str,
        reference_id: Uuid,
    ) -> Result<&LedgerEntry, LedgerError> {
        let entry = TransactionBuilder::new(year, entry_type)
            .payer(payer)
            .payee(payee)
            .amount(amount)
            .reason(reason.to_owned())
            .reference_id(reference_id)
            .build()?;
        debug!(
            year = entry.year,
            entry_type = ?entry.entry_type,
            payer = %entry.payer,
            payee = %entry.payee,
            amount = %entry.amount,
            "Ledger transfer recorded"
        );
        self.entries.push(entry);

        self.entries.last().ok_or(LedgerError::InternalError(
            "failed to retrieve entry after append",
        ))
    }

    /// Record war reparations (loser to winner).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_reparations(
        &mut self,
        year: u32,
        payer: DynastyId,
        payee: DynastyId,
        amount: Decimal,
        war_id: WarId,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.record(
            year,
            LedgerEntryType::Reparations,
            payer,
            payee,
            amount,
            "REPARATIONS",
            war_id.into_inner(),
        )
    }

    /// Record tribute (vassal to overlord).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_tribute(
        &mut self,
        year: u32,
        vassal: DynastyId,
        overlord: DynastyId,
        amount: Decimal,
        treaty_id: TreatyId,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.record(
            year,
            LedgerEntryType::Tribute,
            vassal,
            overlord,
            amount,
            "TRIBUTE",
            treaty_id.into_inner(),
        )
    }

    /// Reconcile dynasty treasuries for a year against the recorded flows.
    ///
    /// `wealth_before` and `wealth_after` are treasury snapshots taken at
    /// the start and end of the year.
    pub fn verify_conservation(
        &self,
        year: u32,
        wealth_before: &BTreeMap<DynastyId, Decimal>,
        wealth_after: &BTreeMap<DynastyId, Decimal>,
    ) -> ConservationResult {
        verify_conservation(year, &self.entries, wealth_before, wealth_after)
    }

    /// Return all entries, in insertion order.
    pub fn all_entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Net gold balance for a dynasty across the whole ledger.
    ///
    /// Positive means the dynasty has received more than it has paid.
    pub fn dynasty_balance(&self, dynasty: DynastyId) -> Decimal {
        let mut balance = Decimal::ZERO;

        for entry in &self.entries {
            if entry.payee == dynasty {
                balance = balance.saturating_add(entry.amount);
            }
            if entry.payer == dynasty {
                balance = balance.saturating_sub(entry.amount);
            }
        }

        balance
    }
}

/// Per-dynasty net flow over the entries of one year.
pub(crate) fn net_flows(year: u32, entries: &[LedgerEntry]) -> BTreeMap<DynastyId, Decimal> {
    let mut flows: BTreeMap<DynastyId, Decimal> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.year == year) {
        let credit = flows.entry(entry.payee).or_insert(Decimal::ZERO);
        *credit = credit.saturating_add(entry.amount);
        let debit = flows.entry(entry.payer).or_insert(Decimal::ZERO);
        *debit = debit.saturating_sub(entry.amount);
    }

    flows
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn reparations_are_recorded_with_war_reference() {
        let mut ledger = Ledger::new();
        let loser = DynastyId::new();
        let winner = DynastyId::new();
        let war = WarId::new();

        let entry = ledger
            .record_reparations(1200, loser, winner, Decimal::new(40, 0), war)
            .unwrap();
        assert_eq!(entry.entry_type, LedgerEntryType::Reparations);
        assert_eq!(entry.reference_id, Some(war.into_inner()));
        assert_eq!(entry.reason, "REPARATIONS");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn tribute_references_treaty() {
        let mut ledger = Ledger::new();
        let treaty = TreatyId::new();
        let vassal = DynastyId::new();
        let entry = ledger
            .record_tribute(3, vassal, DynastyId::new(), Decimal::new(9, 0), treaty)
            .unwrap();
        assert_eq!(entry.payer, vassal);
        assert_eq!(entry.reason, "TRIBUTE");
        assert_eq!(entry.reference_id, Some(treaty.into_inner()));
    }

    #[test]
    fn invalid_transfer_is_not_appended() {
        let mut ledger = Ledger::new();
        let result = ledger.record_tribute(
            1,
            DynastyId::new(),
            DynastyId::new(),
            Decimal::ZERO,
            TreatyId::new(),
        );
        assert!(matches!(result, Err(LedgerError::ZeroAmount)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn balances_net_out_across_entries() {
        let mut ledger = Ledger::new();
        let a = DynastyId::new();
        let b = DynastyId::new();
        ledger
            .record_reparations(1, a, b, Decimal::new(100, 0), WarId::new())
            .unwrap();
        ledger
            .record_tribute(2, b, a, Decimal::new(30, 0), TreatyId::new())
            .unwrap();

        assert_eq!(ledger.dynasty_balance(a), Decimal::new(-70, 0));
        assert_eq!(ledger.dynasty_balance(b), Decimal::new(70, 0));
        assert_eq!(ledger.dynasty_balance(DynastyId::new()), Decimal::ZERO);
        assert_eq!(ledger.all_entries().len(), 2);
    }
}
