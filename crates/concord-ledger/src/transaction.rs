//! Transaction builder and validation for the gold ledger.
//!
//! Every gold movement names a payer (debit) and a payee (credit). The
//! [`TransactionBuilder`] validates inputs before producing a
//! [`LedgerEntry`].

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use concord_types::{DynastyId, LedgerEntry, LedgerEntryId, LedgerEntryType};

use crate::LedgerError;

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// Enforces a strictly positive amount, distinct payer and payee, and a
/// reason.
///
/// # Examples
///
/// ```
/// use concord_ledger::TransactionBuilder;
/// use concord_types::{DynastyId, LedgerEntryType};
/// use rust_decimal::Decimal;
///
/// let entry = TransactionBuilder::new(1200, LedgerEntryType::Tribute)
///     .payer(DynastyId::new())
///     .payee(DynastyId::new())
///     .amount(Decimal::new(12, 0))
///     .reason("TRIBUTE".to_owned())
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    year: u32,
    entry_type: LedgerEntryType,
    payer: Option<DynastyId>,
    payee: Option<DynastyId>,
    amount: Option<Decimal>,
    reason: Option<String>,
    reference_id: Option<Uuid>,
}

impl TransactionBuilder {
    /// Start building a ledger entry for the given year and entry type.
    pub const fn new(year: u32, entry_type: LedgerEntryType) -> Self {
        Self {
            year,
            entry_type,
            payer: None,
            payee: None,
            amount: None,
            reason: None,
            reference_id: None,
        }
    }

    /// Set the paying dynasty (debit side).
    #[must_use]
    pub const fn payer(mut self, dynasty: DynastyId) -> Self {
        self.payer = Some(dynasty);
        self
    }

    /// Set the receiving dynasty (credit side).
    #[must_use]
    pub const fn payee(mut self, dynasty: DynastyId) -> Self {
        self.payee = Some(dynasty);
        self
    }

    /// Set the amount of gold transferred.
    #[must_use]
    pub const fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the human-readable reason for the transfer.
    #[must_use]
    pub fn reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Link the entry to the war or treaty that caused it.
    #[must_use]
    pub const fn reference_id(mut self, id: Uuid) -> Self {
        self.reference_id = Some(id);
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if a required field is not set,
    /// [`LedgerError::ZeroAmount`] or [`LedgerError::NegativeAmount`] for a
    /// non-positive amount, and [`LedgerError::SelfTransfer`] when payer and
    /// payee coincide.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let payer = self.payer.ok_or(LedgerError::MissingField("payer"))?;
        let payee = self.payee.ok_or(LedgerError::MissingField("payee"))?;
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        let reason = self.reason.ok_or(LedgerError::MissingField("reason"))?;

        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount.is_sign_negative() {
            return Err(LedgerError::NegativeAmount { amount });
        }
        if payer == payee {
            return Err(LedgerError::SelfTransfer(payer));
        }

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            year: self.year,
            entry_type: self.entry_type,
            payer,
            payee,
            amount,
            reason,
            reference_id: self.reference_id,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base(amount: Decimal) -> TransactionBuilder {
        TransactionBuilder::new(1, LedgerEntryType::Reparations)
            .payer(DynastyId::new())
            .payee(DynastyId::new())
            .amount(amount)
            .reason("REPARATIONS".to_owned())
    }

    #[test]
    fn builder_produces_valid_entry() {
        let result = base(Decimal::new(5, 0)).build();

        let e = result.unwrap();
        assert_eq!(e.year, 1);
        assert_eq!(e.entry_type, LedgerEntryType::Reparations);
        assert_eq!(e.amount, Decimal::new(5, 0));
        assert_eq!(e.reference_id, None);
    }

    #[test]
    fn zero_amount_rejected() {
        let err = base(Decimal::ZERO).build().err();
        assert!(matches!(err, Some(LedgerError::ZeroAmount)));
    }

    #[test]
    fn negative_amount_rejected() {
        let err = base(Decimal::new(-3, 0)).build().err();
        assert!(matches!(err, Some(LedgerError::NegativeAmount { .. })));
    }

    #[test]
    fn self_transfer_rejected() {
        let dynasty = DynastyId::new();
        let err = TransactionBuilder::new(1, LedgerEntryType::Tribute)
            .payer(dynasty)
            .payee(dynasty)
            .amount(Decimal::ONE)
            .reason("TRIBUTE".to_owned())
            .build()
            .err();
        assert!(matches!(err, Some(LedgerError::SelfTransfer(id)) if id == dynasty));
    }

    #[test]
    fn missing_reason_rejected() {
        let err = TransactionBuilder::new(1, LedgerEntryType::Tribute)
            .payer(DynastyId::new())
            .payee(DynastyId::new())
            .amount(Decimal::ONE)
            .build()
            .err();
        assert!(matches!(err, Some(LedgerError::MissingField("reason"))));
    }

    #[test]
    fn reference_id_is_kept() {
        let war = Uuid::now_v7();
        let entry = base(Decimal::new(2, 0)).reference_id(war).build().ok();
        assert_eq!(entry.and_then(|e| e.reference_id), Some(war));
    }
}
