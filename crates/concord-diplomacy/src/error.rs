//! Error types for the concord-diplomacy crate.
//!
//! Every rejection is a typed value. Returning one of these from inside an
//! operation drops the open transaction, so no partial state is visible.

use concord_ledger::LedgerError;
use concord_types::{DynastyId, TerritoryId, TreatyId, TreatyType, WarId};

/// Errors that can occur during diplomacy operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiplomacyError {
    /// Dynasty with the given ID is not registered.
    #[error("dynasty not found: {0}")]
    DynastyNotFound(DynastyId),

    /// Territory with the given ID is not registered.
    #[error("territory not found: {0}")]
    TerritoryNotFound(TerritoryId),

    /// Treaty with the given ID does not exist.
    #[error("treaty not found: {0}")]
    TreatyNotFound(TreatyId),

    /// War with the given ID does not exist.
    #[error("war not found: {0}")]
    WarNotFound(WarId),

    /// No relation record exists between the two dynasties.
    #[error("no relation between {0} and {1}")]
    RelationNotFound(DynastyId, DynastyId),

    /// The action label does not name a known action kind.
    #[error("invalid action kind: {0}")]
    InvalidActionKind(String),

    /// A dynasty cannot act on, sign with, or war against itself.
    #[error("dynasty {0} cannot conduct diplomacy with itself")]
    SelfDiplomacy(DynastyId),

    /// The relation score is below the treaty type's signing threshold.
    #[error("{treaty_type:?} requires relation {required}, current relation is {actual}")]
    InsufficientRelation {
        /// The treaty type being signed.
        treaty_type: TreatyType,
        /// Minimum score required.
        required: i64,
        /// Current score.
        actual: i64,
    },

    /// An active treaty of the same type already binds the pair.
    #[error("an active {treaty_type:?} treaty already exists: {existing}")]
    DuplicateActiveTreaty {
        /// The treaty type being signed.
        treaty_type: TreatyType,
        /// The treaty already in force.
        existing: TreatyId,
    },

    /// An active war already exists between the pair, in either direction.
    #[error("an active war already exists between the parties: {0}")]
    DuplicateActiveWar(WarId),

    /// The conquest target is not controlled by the defender.
    #[error("territory {territory} is not controlled by defender {defender}")]
    InvalidConquestTarget {
        /// The requested territory.
        territory: TerritoryId,
        /// The defender it should belong to.
        defender: DynastyId,
    },

    /// The enforcing side lacks the war score to impose terms.
    #[error("war score {actual} is below the {required} needed to enforce terms")]
    InsufficientWarScore {
        /// Minimum war score required.
        required: i64,
        /// The enforcing side's war score.
        actual: i64,
    },

    /// The dynasty is not a party to the treaty.
    #[error("dynasty {dynasty} is not a party to treaty {treaty}")]
    NotParty {
        /// The dynasty attempting the operation.
        dynasty: DynastyId,
        /// The treaty in question.
        treaty: TreatyId,
    },

    /// The treaty has already been broken or has expired.
    #[error("treaty is no longer active: {0}")]
    TreatyNotActive(TreatyId),

    /// The war has already ended.
    #[error("war is no longer active: {0}")]
    WarNotActive(WarId),

    /// Treaty or peace terms are malformed.
    #[error("invalid terms: {reason}")]
    InvalidTerms {
        /// Description of what is wrong with the terms.
        reason: String,
    },

    /// The requested term has no implementation.
    #[error("unsupported term: {term}")]
    UnsupportedTerm {
        /// Name of the unsupported term.
        term: &'static str,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A thread panicked while holding the shared diplomacy lock.
    #[error("diplomacy state lock poisoned")]
    StatePoisoned,

    /// An underlying ledger error occurred.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl DiplomacyError {
    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }

    pub(crate) fn invalid_terms(reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            reason: reason.into(),
        }
    }
}
