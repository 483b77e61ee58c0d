//! Shared type definitions for the Concord diplomacy core.
//!
//! This crate is the single source of truth for all types used across the
//! Concord workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for game front-ends.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the canonical [`DynastyPair`]
//! - [`enums`] -- Relation bands, treaty types, action kinds, war goals, events
//! - [`structs`] -- Dynasties, territories, treaties, wars, events, ledger entries
//! - [`terms`] -- Structured treaty and peace terms

pub mod enums;
pub mod ids;
pub mod structs;
pub mod terms;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActionKind, EventType, LedgerEntryType, RelationStatus, TreatyType, UnknownActionKind, WarGoal,
};
pub use ids::{DynastyId, DynastyPair, EventId, LedgerEntryId, TerritoryId, TreatyId, WarId};
pub use structs::{DiplomaticEvent, Dynasty, LedgerEntry, Territory, Treaty, War};
pub use terms::{PeaceTerms, TreatyTerms, VassalageTerms};
