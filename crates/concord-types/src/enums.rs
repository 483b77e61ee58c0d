//! Enumeration types for the Concord diplomacy core.
//!
//! The per-kind numeric tables (treaty gates, signing bonuses, action
//! magnitudes) are written as exhaustive `match` expressions on these enums.
//! Adding a variant without extending every table is a compile error.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Relation status
// ---------------------------------------------------------------------------

/// Banded reading of a relation score.
///
/// Derived, never stored. Bands are inclusive at their lower bound and are
/// evaluated from the highest tier down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    /// Score below -75.
    Nemesis,
    /// Score in -75..=-51.
    Hostile,
    /// Score in -50..=-26.
    Unfriendly,
    /// Score in -25..=24.
    Neutral,
    /// Score in 25..=49.
    Cordial,
    /// Score in 50..=74.
    Friendly,
    /// Score of 75 or more.
    Allied,
    /// No relation record exists between the pair.
    Unknown,
}

impl RelationStatus {
    /// Map a relation score to its band.
    pub const fn from_score(score: i64) -> Self {
        if score >= 75 {
            Self::Allied
        } else if score >= 50 {
            Self::Friendly
        } else if score >= 25 {
            Self::Cordial
        } else if score >= -25 {
            Self::Neutral
        } else if score >= -50 {
            Self::Unfriendly
        } else if score >= -75 {
            Self::Hostile
        } else {
            Self::Nemesis
        }
    }

    /// Human-readable label ("Allied", "Unknown", ...).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nemesis => "Nemesis",
            Self::Hostile => "Hostile",
            Self::Unfriendly => "Unfriendly",
            Self::Neutral => "Neutral",
            Self::Cordial => "Cordial",
            Self::Friendly => "Friendly",
            Self::Allied => "Allied",
            Self::Unknown => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Treaty types
// ---------------------------------------------------------------------------

/// The kind of a bilateral treaty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum TreatyType {
    /// Mutual promise not to attack.
    NonAggression,
    /// Mutual defence if either party is attacked.
    DefensiveAlliance,
    /// Full military alliance.
    MilitaryAlliance,
    /// Subordination of a vassal to an overlord.
    Vassalage,
    /// Reduced tariffs between the parties.
    TradeAgreement,
    /// Open access to each other's markets.
    MarketAccess,
    /// Regular exchange of strategic resources.
    ResourceExchange,
    /// Shared currency and customs.
    EconomicUnion,
    /// Exchange of scholars and artists.
    CulturalExchange,
    /// Marriage between the ruling houses.
    RoyalMarriage,
}

impl TreatyType {
    /// Every treaty type, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::NonAggression,
        Self::DefensiveAlliance,
        Self::MilitaryAlliance,
        Self::Vassalage,
        Self::TradeAgreement,
        Self::MarketAccess,
        Self::ResourceExchange,
        Self::EconomicUnion,
        Self::CulturalExchange,
        Self::RoyalMarriage,
    ];

    /// Minimum relation score required to sign this treaty voluntarily.
    pub const fn min_relation(self) -> i64 {
        match self {
            Self::NonAggression | Self::TradeAgreement => -25,
            Self::DefensiveAlliance
            | Self::ResourceExchange
            | Self::CulturalExchange
            | Self::RoyalMarriage => 25,
            Self::MilitaryAlliance | Self::EconomicUnion => 50,
            Self::Vassalage => -50,
            Self::MarketAccess => 0,
        }
    }

    /// Relation change applied when the treaty is signed.
    pub const fn signing_bonus(self) -> i64 {
        match self {
            Self::NonAggression | Self::TradeAgreement | Self::MarketAccess => 5,
            Self::DefensiveAlliance | Self::EconomicUnion => 10,
            Self::MilitaryAlliance | Self::RoyalMarriage => 15,
            Self::Vassalage => -10,
            Self::ResourceExchange | Self::CulturalExchange => 8,
        }
    }

    /// Whether a declaration of war between the parties voids this treaty.
    pub const fn is_peace_incompatible(self) -> bool {
        matches!(
            self,
            Self::NonAggression | Self::DefensiveAlliance | Self::MilitaryAlliance
        )
    }

    /// Display name used in event text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NonAggression => "Non-Aggression Pact",
            Self::DefensiveAlliance => "Defensive Alliance",
            Self::MilitaryAlliance => "Military Alliance",
            Self::Vassalage => "Vassalage",
            Self::TradeAgreement => "Trade Agreement",
            Self::MarketAccess => "Market Access",
            Self::ResourceExchange => "Resource Exchange",
            Self::EconomicUnion => "Economic Union",
            Self::CulturalExchange => "Cultural Exchange",
            Self::RoyalMarriage => "Royal Marriage",
        }
    }
}

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// A discrete diplomatic action one dynasty performs towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Send a diplomatic envoy.
    SendEnvoy,
    /// Propose a marriage alliance.
    ArrangeMarriage,
    /// Publicly name the target a rival.
    DeclareRivalry,
    /// Deliver an ultimatum.
    IssueUltimatum,
    /// Mediate peace on the target's behalf.
    BrokerPeace,
    /// Spread rumours about the target's court.
    SpreadRumors,
    /// Bribe the target's officials.
    BribeOfficials,
    /// Stir unrest in the target's lands.
    InciteUnrest,
    /// Plot to assassinate a member of the target's house.
    Assassinate,
    /// Send a gift.
    Gift,
    /// Insult the target.
    Insult,
    /// Demand tribute.
    DemandTribute,
    /// Offer tribute.
    OfferTribute,
    /// Announce hostile intent (relation effect only; see the war manager).
    DeclareWar,
    /// Propose peace.
    OfferPeace,
    /// Repudiate an agreement (relation effect only; see the treaty manager).
    BreakTreaty,
    /// Sponsor a cultural exchange.
    CulturalExchange,
    /// Educate a royal ward at the target's court.
    RoyalEducation,
}

impl ActionKind {
    /// Every action kind, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::SendEnvoy,
        Self::ArrangeMarriage,
        Self::DeclareRivalry,
        Self::IssueUltimatum,
        Self::BrokerPeace,
        Self::SpreadRumors,
        Self::BribeOfficials,
        Self::InciteUnrest,
        Self::Assassinate,
        Self::Gift,
        Self::Insult,
        Self::DemandTribute,
        Self::OfferTribute,
        Self::DeclareWar,
        Self::OfferPeace,
        Self::BreakTreaty,
        Self::CulturalExchange,
        Self::RoyalEducation,
    ];

    /// Signed relation change before reputation modifiers.
    pub const fn base_magnitude(self) -> i64 {
        match self {
            Self::SendEnvoy => 5,
            Self::ArrangeMarriage => 10,
            Self::DeclareRivalry => -20,
            Self::IssueUltimatum => -10,
            Self::BrokerPeace | Self::OfferPeace => 15,
            Self::SpreadRumors => -5,
            Self::BribeOfficials => 3,
            Self::InciteUnrest => -15,
            Self::Assassinate => -30,
            Self::Gift | Self::RoyalEducation => 8,
            Self::Insult => -8,
            Self::DemandTribute => -12,
            Self::OfferTribute => 12,
            Self::DeclareWar => -40,
            Self::BreakTreaty => -25,
            Self::CulturalExchange => 7,
        }
    }

    /// Whether a low-honor actor suffers an amplified penalty for this action.
    pub const fn is_honor_sensitive(self) -> bool {
        matches!(self, Self::BreakTreaty | Self::DeclareWar)
    }

    /// Stable `snake_case` label, also used as the relation change reason.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SendEnvoy => "send_envoy",
            Self::ArrangeMarriage => "arrange_marriage",
            Self::DeclareRivalry => "declare_rivalry",
            Self::IssueUltimatum => "issue_ultimatum",
            Self::BrokerPeace => "broker_peace",
            Self::SpreadRumors => "spread_rumors",
            Self::BribeOfficials => "bribe_officials",
            Self::InciteUnrest => "incite_unrest",
            Self::Assassinate => "assassinate",
            Self::Gift => "gift",
            Self::Insult => "insult",
            Self::DemandTribute => "demand_tribute",
            Self::OfferTribute => "offer_tribute",
            Self::DeclareWar => "declare_war",
            Self::OfferPeace => "offer_peace",
            Self::BreakTreaty => "break_treaty",
            Self::CulturalExchange => "cultural_exchange",
            Self::RoyalEducation => "royal_education",
        }
    }

    /// Parse a `snake_case` label. Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

/// Returned when parsing an [`ActionKind`] from an unrecognised label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action kind: {0}")]
pub struct UnknownActionKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownActionKind(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// War goals
// ---------------------------------------------------------------------------

/// The declared objective of a war.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum WarGoal {
    /// Seize a territory held by the defender.
    Conquest,
    /// Reduce the defender to vassalage.
    Subjugation,
    /// Extract tribute or reparations.
    Tribute,
    /// Humble the defender without territorial aims.
    Humiliation,
}

impl WarGoal {
    /// Lowercase description used in event text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Conquest => "conquest",
            Self::Subjugation => "subjugation",
            Self::Tribute => "tribute",
            Self::Humiliation => "humiliation",
        }
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Category of a [`DiplomaticEvent`](crate::structs::DiplomaticEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// The recipient performed a diplomatic action.
    ActionTaken,
    /// The recipient was the target of a diplomatic action.
    ActionReceived,
    /// The recipient carried out a plot undetected.
    PlotExecuted,
    /// A plot was exposed (both sides are told).
    PlotDiscovered,
    /// A treaty was signed.
    TreatySigned,
    /// A treaty was broken.
    TreatyBroken,
    /// A treaty ran out its duration.
    TreatyExpired,
    /// A war was declared.
    WarDeclared,
    /// A war ended with a peace treaty.
    PeaceSigned,
    /// The recipient gained control of a territory.
    TerritoryGained,
    /// The recipient lost control of a territory.
    TerritoryLost,
    /// The recipient paid reparations.
    ReparationsPaid,
    /// The recipient received reparations.
    ReparationsReceived,
    /// A vassalage relationship was imposed.
    VassalageFormed,
    /// The recipient paid tribute to its overlord.
    TributePaid,
    /// The recipient collected tribute from a vassal.
    TributeReceived,
}

// ---------------------------------------------------------------------------
// Ledger entry types
// ---------------------------------------------------------------------------

/// Category of a gold transfer recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    /// War reparations paid by the loser to the winner of a war.
    Reparations,
    /// Tribute paid by a vassal to its overlord.
    Tribute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_band_boundaries() {
        assert_eq!(RelationStatus::from_score(75), RelationStatus::Allied);
        assert_eq!(RelationStatus::from_score(74), RelationStatus::Friendly);
        assert_eq!(RelationStatus::from_score(50), RelationStatus::Friendly);
        assert_eq!(RelationStatus::from_score(49), RelationStatus::Cordial);
        assert_eq!(RelationStatus::from_score(25), RelationStatus::Cordial);
        assert_eq!(RelationStatus::from_score(24), RelationStatus::Neutral);
        assert_eq!(RelationStatus::from_score(-25), RelationStatus::Neutral);
        assert_eq!(RelationStatus::from_score(-26), RelationStatus::Unfriendly);
        assert_eq!(RelationStatus::from_score(-50), RelationStatus::Unfriendly);
        assert_eq!(RelationStatus::from_score(-51), RelationStatus::Hostile);
        assert_eq!(RelationStatus::from_score(-75), RelationStatus::Hostile);
        assert_eq!(RelationStatus::from_score(-76), RelationStatus::Nemesis);
    }

    #[test]
    fn status_extremes() {
        assert_eq!(RelationStatus::from_score(i64::MAX), RelationStatus::Allied);
        assert_eq!(RelationStatus::from_score(i64::MIN), RelationStatus::Nemesis);
        assert_eq!(RelationStatus::from_score(0), RelationStatus::Neutral);
    }

    #[test]
    fn treaty_table_matches_design() {
        assert_eq!(TreatyType::MilitaryAlliance.min_relation(), 50);
        assert_eq!(TreatyType::MilitaryAlliance.signing_bonus(), 15);
        assert_eq!(TreatyType::Vassalage.min_relation(), -50);
        assert_eq!(TreatyType::Vassalage.signing_bonus(), -10);
        assert_eq!(TreatyType::MarketAccess.min_relation(), 0);
        assert_eq!(TreatyType::ResourceExchange.signing_bonus(), 8);
    }

    #[test]
    fn only_military_treaties_are_peace_incompatible() {
        let incompatible: Vec<TreatyType> = TreatyType::ALL
            .into_iter()
            .filter(|t| t.is_peace_incompatible())
            .collect();
        assert_eq!(
            incompatible,
            vec![
                TreatyType::NonAggression,
                TreatyType::DefensiveAlliance,
                TreatyType::MilitaryAlliance,
            ]
        );
    }

    #[test]
    fn action_labels_round_trip_through_from_label() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(ActionKind::from_label("summon_dragon"), None);
    }

    #[test]
    fn from_str_reports_unknown_label() {
        assert_eq!("gift".parse::<ActionKind>(), Ok(ActionKind::Gift));
        assert_eq!(
            "summon_dragon".parse::<ActionKind>(),
            Err(UnknownActionKind("summon_dragon".to_owned()))
        );
    }

    #[test]
    fn action_labels_match_serde_names() {
        for kind in ActionKind::ALL {
            let json = serde_json::to_string(&kind).ok();
            assert_eq!(json, Some(format!("\"{}\"", kind.label())));
        }
    }

    #[test]
    fn honor_sensitive_actions() {
        assert!(ActionKind::BreakTreaty.is_honor_sensitive());
        assert!(ActionKind::DeclareWar.is_honor_sensitive());
        assert!(!ActionKind::Insult.is_honor_sensitive());
    }
}
