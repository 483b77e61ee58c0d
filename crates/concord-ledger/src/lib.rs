//! Append-only gold ledger for the Concord diplomacy core.
//!
//! Diplomacy moves gold between dynasties in two ways: war reparations
//! imposed at the peace table, and tribute collected from vassals. Both are
//! transfers. Gold is never minted or burned by diplomacy, and every
//! transfer is recorded here.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: append-only log with recording methods.
//! - [`transaction`] -- The [`TransactionBuilder`] for validated entry construction.
//! - [`conservation`] -- Reconciliation of dynasty treasuries against the log.
//!
//! # Conservation Law
//!
//! For every year Y and every dynasty D:
//!
//! ```text
//! wealth_after(D) - wealth_before(D) == credits(D, Y) - debits(D, Y)
//! sum(wealth_after) == sum(wealth_before)
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics; it
//! returns errors.
//!
//! # Entry Types
//!
//! | Type | Payer (debit) | Payee (credit) |
//! |------|---------------|----------------|
//! | Reparations | Losing belligerent | Enforcing belligerent |
//! | Tribute | Vassal | Overlord |
//!
//! # Usage
//!
//! ```
//! use concord_ledger::Ledger;
//! use concord_types::{DynastyId, WarId};
//! use rust_decimal::Decimal;
//!
//! let mut ledger = Ledger::new();
//! let loser = DynastyId::new();
//! let winner = DynastyId::new();
//!
//! ledger
//!     .record_reparations(1200, loser, winner, Decimal::new(150, 0), WarId::new())
//!     .ok();
//!
//! assert_eq!(ledger.dynasty_balance(winner), Decimal::new(150, 0));
//! assert_eq!(ledger.dynasty_balance(loser), Decimal::new(-150, 0));
//! ```

pub mod conservation;
pub mod ledger;
pub mod transaction;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use ledger::Ledger;
pub use transaction::TransactionBuilder;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use concord_types::DynastyId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("ledger entry amount must be non-zero")]
    ZeroAmount,

    /// Amount must not be negative.
    #[error("ledger entry amount must be positive, got {amount}")]
    NegativeAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// A dynasty cannot pay itself.
    #[error("payer and payee are the same dynasty: {0}")]
    SelfTransfer(DynastyId),

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation detected while reconciling a year.
///
/// Produced when a dynasty's treasury moved by a different amount than its
/// recorded net flow, or when total wealth changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAnomaly {
    /// The year that failed reconciliation.
    pub year: u32,
    /// Per-dynasty mismatch: (`ledger_net_flow`, `observed_wealth_change`).
    pub imbalances: BTreeMap<DynastyId, (Decimal, Decimal)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
