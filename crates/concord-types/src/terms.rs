//! Structured treaty and peace terms.
//!
//! Treaty terms are a tagged variant per treaty family rather than a loose
//! key/value bag. The serialized shape stays a small JSON object, so an
//! orchestrator reading it sees `{"vassalage": {...}}` or
//! `{"clauses": {...}}`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{DynastyId, TerritoryId};

/// Terms of a vassalage treaty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VassalageTerms {
    /// The dominant party, receiving tribute.
    pub overlord: DynastyId,
    /// The subordinate party, paying tribute.
    pub vassal: DynastyId,
    /// Fraction of the vassal's wealth paid per collection (0.10 = 10%).
    #[ts(as = "String")]
    pub tribute_rate: Decimal,
}

/// Optional structured payload attached to a treaty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum TreatyTerms {
    /// Overlord, vassal and tribute rate of a vassalage.
    Vassalage(VassalageTerms),
    /// Free-form named clauses for any other treaty type.
    Clauses(BTreeMap<String, String>),
}

impl TreatyTerms {
    /// The vassalage terms, if this payload carries them.
    pub const fn as_vassalage(&self) -> Option<&VassalageTerms> {
        match self {
            Self::Vassalage(terms) => Some(terms),
            Self::Clauses(_) => None,
        }
    }
}

/// Terms the enforcing side of a war imposes at the peace table.
///
/// Every category is optional. Categories are processed independently in
/// field order: territory, gold, vassalization, vassal release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(default)]
pub struct PeaceTerms {
    /// Territory to hand over to the enforcing side.
    pub territory: Option<TerritoryId>,
    /// Gold the losing side pays to the enforcing side.
    #[ts(as = "Option<String>")]
    pub gold: Option<Decimal>,
    /// Reduce the defender to a vassal (attacker-enforced only).
    pub vassalize: bool,
    /// Release the defender from vassalage (defender-enforced; unsupported).
    pub release_vassal: bool,
}
