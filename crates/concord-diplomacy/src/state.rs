//! Committed diplomacy state.
//!
//! [`DiplomacyState`] holds everything the core owns or borrows from the
//! directories: dynasties, territories, relation records, treaties, wars and
//! the gold ledger. It is only ever mutated in two ways: directory
//! registration, and [`DiplomacyState::commit`] of a finished transaction.

use std::collections::BTreeMap;

use concord_ledger::Ledger;
use concord_types::{
    DiplomaticEvent, Dynasty, DynastyId, DynastyPair, Territory, TerritoryId, Treaty, TreatyId, War,
    WarId,
};

use crate::relations::RelationStore;
use crate::transaction::Changes;

/// The committed world as seen by the diplomacy core.
#[derive(Debug, Clone, Default)]
pub struct DiplomacyState {
    pub(crate) dynasties: BTreeMap<DynastyId, Dynasty>,
    pub(crate) territories: BTreeMap<TerritoryId, Territory>,
    pub(crate) relations: RelationStore,
    pub(crate) treaties: BTreeMap<TreatyId, Treaty>,
    pub(crate) wars: BTreeMap<WarId, War>,
    pub(crate) ledger: Ledger,
}

impl DiplomacyState {
    /// Create an empty state.
    pub const fn new() -> Self {
        Self {
            dynasties: BTreeMap::new(),
            territories: BTreeMap::new(),
            relations: RelationStore::new(),
            treaties: BTreeMap::new(),
            wars: BTreeMap::new(),
            ledger: Ledger::new(),
        }
    }

    /// Add or replace a dynasty in the directory.
    pub fn register_dynasty(&mut self, dynasty: Dynasty) -> DynastyId {
        let id = dynasty.id;
        self.dynasties.insert(id, dynasty);
        id
    }

    /// Add or replace a territory in the directory.
    pub fn register_territory(&mut self, territory: Territory) -> TerritoryId {
        let id = territory.id;
        self.territories.insert(id, territory);
        id
    }

    /// Look up a dynasty.
    pub fn dynasty(&self, id: DynastyId) -> Option<&Dynasty> {
        self.dynasties.get(&id)
    }

    /// Every registered dynasty, ordered by id.
    pub fn dynasties(&self) -> impl Iterator<Item = &Dynasty> {
        self.dynasties.values()
    }

    /// Look up a territory.
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    /// Look up a treaty.
    pub fn treaty(&self, id: TreatyId) -> Option<&Treaty> {
        self.treaties.get(&id)
    }

    /// Every treaty ever signed.
    pub fn treaties(&self) -> impl Iterator<Item = &Treaty> {
        self.treaties.values()
    }

    /// Look up a war.
    pub fn war(&self, id: WarId) -> Option<&War> {
        self.wars.get(&id)
    }

    /// Every war ever declared.
    pub fn wars(&self) -> impl Iterator<Item = &War> {
        self.wars.values()
    }

    /// Active treaties between two dynasties, in either order.
    pub fn active_treaties_between(&self, a: DynastyId, b: DynastyId) -> Vec<&Treaty> {
        let pair = DynastyPair::new(a, b);
        self.treaties
            .values()
            .filter(|t| t.active && t.pair == pair)
            .collect()
    }

    /// The active war between two dynasties, in either direction.
    pub fn active_war_between(&self, a: DynastyId, b: DynastyId) -> Option<&War> {
        let pair = DynastyPair::new(a, b);
        self.wars.values().find(|w| w.active && w.pair() == pair)
    }

    /// The relation records.
    pub const fn relations(&self) -> &RelationStore {
        &self.relations
    }

    /// Mutable access to the relation records (lazy creation on read).
    pub const fn relations_mut(&mut self) -> &mut RelationStore {
        &mut self.relations
    }

    /// The gold ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Treasury snapshot of every dynasty.
    pub fn wealth_snapshot(&self) -> BTreeMap<DynastyId, rust_decimal::Decimal> {
        self.dynasties
            .values()
            .map(|d| (d.id, d.wealth))
            .collect()
    }

    /// Write a finished transaction's staged changes and return its events.
    pub(crate) fn commit(&mut self, changes: Changes) -> Vec<DiplomaticEvent> {
        self.dynasties.extend(changes.dynasties);
        self.territories.extend(changes.territories);
        for record in changes.relations.into_values() {
            self.relations.upsert(record);
        }
        self.treaties.extend(changes.treaties);
        self.wars.extend(changes.wars);
        for entry in changes.ledger_entries {
            self.ledger.append(entry);
        }
        changes.events
    }
}
