//! Core entity structs for the Concord diplomacy core.
//!
//! Dynasties and territories are owned by external directories; the
//! diplomacy core reads them and mutates a small set of fields (reputation,
//! wealth, territory controller). Treaties, wars, events and ledger entries
//! are owned here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{EventType, LedgerEntryType, TreatyType, WarGoal};
use crate::ids::{DynastyId, DynastyPair, EventId, LedgerEntryId, TerritoryId, TreatyId, WarId};
use crate::terms::TreatyTerms;

// ---------------------------------------------------------------------------
// Dynasty
// ---------------------------------------------------------------------------

/// A player- or AI-controlled polity with reputation attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Dynasty {
    /// Unique dynasty identifier.
    pub id: DynastyId,
    /// Display name.
    pub name: String,
    /// Trustworthiness. Low honor amplifies penalties for treaty breaking and war.
    pub honor: i64,
    /// Standing among peers. Higher prestige amplifies action effects.
    pub prestige: i64,
    /// Notoriety accumulated through aggression and plots.
    pub infamy: i64,
    /// Treasury in gold. Never negative.
    #[ts(as = "String")]
    pub wealth: Decimal,
    /// The dynasty's current calendar year.
    pub current_year: u32,
}

impl Dynasty {
    /// Default honor for a new dynasty.
    pub const DEFAULT_HONOR: i64 = 50;
    /// Default prestige for a new dynasty.
    pub const DEFAULT_PRESTIGE: i64 = 50;

    /// Create a dynasty with neutral reputation, an empty treasury and year 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DynastyId::new(),
            name: name.into(),
            honor: Self::DEFAULT_HONOR,
            prestige: Self::DEFAULT_PRESTIGE,
            infamy: 0,
            wealth: Decimal::ZERO,
            current_year: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Territory
// ---------------------------------------------------------------------------

/// A named piece of land controlled by at most one dynasty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Territory {
    /// Unique territory identifier.
    pub id: TerritoryId,
    /// Display name.
    pub name: String,
    /// The controlling dynasty, if any.
    pub controller: Option<DynastyId>,
}

// ---------------------------------------------------------------------------
// Treaty
// ---------------------------------------------------------------------------

/// A typed bilateral agreement between the two members of a relation pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Treaty {
    /// Unique treaty identifier.
    pub id: TreatyId,
    /// The kind of treaty.
    pub treaty_type: TreatyType,
    /// The relation pair this treaty belongs to.
    pub pair: DynastyPair,
    /// Year the treaty was signed.
    pub start_year: u32,
    /// Length in years. `None` means permanent.
    pub duration: Option<u32>,
    /// Whether the treaty is in force. Treaties are deactivated, never deleted.
    pub active: bool,
    /// Structured terms, if any.
    pub terms: Option<TreatyTerms>,
}

impl Treaty {
    /// The year the treaty lapses, or `None` for permanent treaties.
    pub fn expiry_year(&self) -> Option<u32> {
        self.duration
            .map(|years| self.start_year.saturating_add(years))
    }
}

// ---------------------------------------------------------------------------
// War
// ---------------------------------------------------------------------------

/// An armed conflict between an attacker and a defender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct War {
    /// Unique war identifier.
    pub id: WarId,
    /// The dynasty that declared the war.
    pub attacker: DynastyId,
    /// The dynasty the war was declared on.
    pub defender: DynastyId,
    /// Declared objective.
    pub war_goal: WarGoal,
    /// Territory the attacker seeks, for conquest wars.
    pub target_territory: Option<TerritoryId>,
    /// Year of declaration.
    pub start_year: u32,
    /// Year the war ended, once it has.
    pub end_year: Option<u32>,
    /// Attacker's accumulated war score (set by the combat collaborator).
    pub attacker_war_score: i64,
    /// Defender's accumulated war score (set by the combat collaborator).
    pub defender_war_score: i64,
    /// Whether the war is ongoing.
    pub active: bool,
    /// The side that enforced peace terms, once the war is over.
    pub winner: Option<DynastyId>,
}

impl War {
    /// The canonical relation pair of the belligerents.
    pub fn pair(&self) -> DynastyPair {
        DynastyPair::new(self.attacker, self.defender)
    }
}

// ---------------------------------------------------------------------------
// DiplomaticEvent
// ---------------------------------------------------------------------------

/// A human-readable record delivered to one dynasty's event log.
///
/// Every state change produces one event per affected party, worded from
/// that party's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DiplomaticEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// The dynasty whose log receives this event.
    pub dynasty_id: DynastyId,
    /// Recipient's calendar year at the time of the event.
    pub year: u32,
    /// Narrative text.
    pub text: String,
    /// Category of event.
    pub event_type: EventType,
    /// Related treaty, if any.
    pub treaty_id: Option<TreatyId>,
    /// Related war, if any.
    pub war_id: Option<WarId>,
    /// Related territory, if any.
    pub territory_id: Option<TerritoryId>,
    /// Type-specific payload serialized as JSON.
    pub details: serde_json::Value,
    /// Real-world timestamp when the event was created.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// LedgerEntry
// ---------------------------------------------------------------------------

/// A single gold transfer between two dynasties.
///
/// Diplomacy never creates or destroys gold; every payment it makes is a
/// transfer recorded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// Calendar year of the transfer (the payer's year).
    pub year: u32,
    /// The category of transfer.
    pub entry_type: LedgerEntryType,
    /// Dynasty the gold leaves.
    pub payer: DynastyId,
    /// Dynasty the gold arrives at.
    pub payee: DynastyId,
    /// Amount transferred (always positive).
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Reason for the transfer (e.g. `"REPARATIONS"`, `"TRIBUTE"`).
    pub reason: String,
    /// Related war or treaty identifier.
    pub reference_id: Option<Uuid>,
    /// Real-world timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_dynasty_has_neutral_reputation() {
        let dynasty = Dynasty::new("Valois");
        assert_eq!(dynasty.honor, 50);
        assert_eq!(dynasty.prestige, 50);
        assert_eq!(dynasty.infamy, 0);
        assert_eq!(dynasty.wealth, Decimal::ZERO);
        assert_eq!(dynasty.current_year, 1);
    }

    #[test]
    fn permanent_treaty_has_no_expiry() {
        let treaty = Treaty {
            id: TreatyId::new(),
            treaty_type: TreatyType::NonAggression,
            pair: DynastyPair::new(DynastyId::new(), DynastyId::new()),
            start_year: 1200,
            duration: None,
            active: true,
            terms: None,
        };
        assert_eq!(treaty.expiry_year(), None);

        let timed = Treaty {
            duration: Some(5),
            ..treaty
        };
        assert_eq!(timed.expiry_year(), Some(1205));
    }

    #[test]
    fn war_pair_ignores_direction() {
        let attacker = DynastyId::new();
        let defender = DynastyId::new();
        let war = War {
            id: WarId::new(),
            attacker,
            defender,
            war_goal: WarGoal::Humiliation,
            target_territory: None,
            start_year: 1,
            end_year: None,
            attacker_war_score: 0,
            defender_war_score: 0,
            active: true,
            winner: None,
        };
        assert_eq!(war.pair(), DynastyPair::new(defender, attacker));
    }
}
