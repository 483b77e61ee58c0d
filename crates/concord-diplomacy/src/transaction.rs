//! Copy-on-write transactions over [`DiplomacyState`].
//!
//! A [`Transaction`] reads through to the committed state and stages every
//! write in its own maps. Records are cloned into the overlay on first
//! mutation. Events and ledger entries are appended to staging buffers.
//!
//! - **Commit**: [`Transaction::into_changes`] hands the overlay to
//!   [`DiplomacyState::commit`].
//! - **Rollback**: dropping the transaction discards the overlay.
//! - **Savepoints**: [`Transaction::savepoint`] runs a closure and restores
//!   the overlay if it fails, so one peace term category can be undone
//!   without aborting the whole settlement.
//!
//! Operations that call other operations (war declaration breaking
//! treaties) pass the same transaction down, so they commit or roll back as
//! one unit.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use concord_ledger::{Ledger, LedgerError};
use concord_types::{
    DiplomaticEvent, Dynasty, DynastyId, DynastyPair, LedgerEntry, Territory, TerritoryId, Treaty,
    TreatyId, TreatyType, War, WarId,
};

use crate::config::RelationConfig;
use crate::error::DiplomacyError;
use crate::events::Notice;
use crate::relations::RelationRecord;
use crate::state::DiplomacyState;

/// Staged changes of a finished transaction.
#[derive(Debug, Default)]
pub(crate) struct Changes {
    pub(crate) dynasties: BTreeMap<DynastyId, Dynasty>,
    pub(crate) territories: BTreeMap<TerritoryId, Territory>,
    pub(crate) relations: BTreeMap<DynastyPair, RelationRecord>,
    pub(crate) treaties: BTreeMap<TreatyId, Treaty>,
    pub(crate) wars: BTreeMap<WarId, War>,
    pub(crate) ledger_entries: Vec<LedgerEntry>,
    pub(crate) events: Vec<DiplomaticEvent>,
}

/// An open unit of work against the diplomacy state.
#[derive(Debug, Clone)]
pub struct Transaction<'s> {
    base: &'s DiplomacyState,
    bounds: RelationConfig,
    dynasties: BTreeMap<DynastyId, Dynasty>,
    territories: BTreeMap<TerritoryId, Territory>,
    relations: BTreeMap<DynastyPair, RelationRecord>,
    treaties: BTreeMap<TreatyId, Treaty>,
    wars: BTreeMap<WarId, War>,
    ledger: Ledger,
    events: Vec<DiplomaticEvent>,
}

impl<'s> Transaction<'s> {
    /// Open a transaction over `base`. Relation changes are clamped to `bounds`.
    pub const fn begin(base: &'s DiplomacyState, bounds: RelationConfig) -> Self {
        Self {
            base,
            bounds,
            dynasties: BTreeMap::new(),
            territories: BTreeMap::new(),
            relations: BTreeMap::new(),
            treaties: BTreeMap::new(),
            wars: BTreeMap::new(),
            ledger: Ledger::new(),
            events: Vec::new(),
        }
    }

    /// Run `f`; if it fails, restore the transaction to its state before the call.
    pub fn savepoint<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, DiplomacyError>,
    ) -> Result<T, DiplomacyError> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    /// Number of events staged so far.
    pub fn staged_events(&self) -> usize {
        self.events.len()
    }

    /// Finish the transaction, yielding its staged changes.
    pub(crate) fn into_changes(self) -> Changes {
        Changes {
            dynasties: self.dynasties,
            territories: self.territories,
            relations: self.relations,
            treaties: self.treaties,
            wars: self.wars,
            ledger_entries: self.ledger.all_entries().to_vec(),
            events: self.events,
        }
    }

    // -----------------------------------------------------------------------
    // Dynasties
    // -----------------------------------------------------------------------

    /// Read a dynasty.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::DynastyNotFound`] if it is not registered.
    pub fn dynasty(&self, id: DynastyId) -> Result<&Dynasty, DiplomacyError> {
        self.dynasties
            .get(&id)
            .or_else(|| self.base.dynasties.get(&id))
            .ok_or(DiplomacyError::DynastyNotFound(id))
    }

    /// Mutable access to a dynasty.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::DynastyNotFound`] if it is not registered.
    pub fn dynasty_mut(&mut self, id: DynastyId) -> Result<&mut Dynasty, DiplomacyError> {
        match self.dynasties.entry(id) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let committed = self
                    .base
                    .dynasties
                    .get(&id)
                    .ok_or(DiplomacyError::DynastyNotFound(id))?;
                Ok(slot.insert(committed.clone()))
            }
        }
    }

    /// Ids of every registered dynasty.
    pub fn dynasty_ids(&self) -> Vec<DynastyId> {
        merged_keys(&self.base.dynasties, &self.dynasties)
    }

    /// Current calendar year of a dynasty.
    pub fn year_of(&self, id: DynastyId) -> Result<u32, DiplomacyError> {
        self.dynasty(id).map(|d| d.current_year)
    }

    /// Display name of a dynasty.
    pub fn name_of(&self, id: DynastyId) -> Result<String, DiplomacyError> {
        self.dynasty(id).map(|d| d.name.clone())
    }

    // -----------------------------------------------------------------------
    // Territories
    // -----------------------------------------------------------------------

    /// Read a territory.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::TerritoryNotFound`] if it is not registered.
    pub fn territory(&self, id: TerritoryId) -> Result<&Territory, DiplomacyError> {
        self.territories
            .get(&id)
            .or_else(|| self.base.territories.get(&id))
            .ok_or(DiplomacyError::TerritoryNotFound(id))
    }

    /// Mutable access to a territory.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::TerritoryNotFound`] if it is not registered.
    pub fn territory_mut(&mut self, id: TerritoryId) -> Result<&mut Territory, DiplomacyError> {
        match self.territories.entry(id) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let committed = self
                    .base
                    .territories
                    .get(&id)
                    .ok_or(DiplomacyError::TerritoryNotFound(id))?;
                Ok(slot.insert(committed.clone()))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Relations
    // -----------------------------------------------------------------------

    /// Read the relation record of a pair, if one exists.
    pub fn relation(&self, a: DynastyId, b: DynastyId) -> Option<&RelationRecord> {
        let pair = DynastyPair::new(a, b);
        self.relations
            .get(&pair)
            .or_else(|| self.base.relations.get(a, b))
    }

    /// Mutable access to the relation record of a pair, created with a
    /// neutral score if absent.
    pub fn relation_or_create(&mut self, a: DynastyId, b: DynastyId) -> &mut RelationRecord {
        let pair = DynastyPair::new(a, b);
        let base = self.base;
        self.relations.entry(pair).or_insert_with(|| {
            base.relations
                .get(a, b)
                .cloned()
                .unwrap_or_else(|| RelationRecord::new(pair))
        })
    }

    /// Current score of a pair, creating the record if absent.
    pub fn score(&mut self, a: DynastyId, b: DynastyId) -> i64 {
        self.relation_or_create(a, b).score
    }

    /// Move the score of a pair, creating the record if absent.
    ///
    /// The change is logged under `reason` in `a`'s current year. Returns the
    /// new score.
    pub fn apply_delta(
        &mut self,
        a: DynastyId,
        b: DynastyId,
        reason: &str,
        amount: i64,
    ) -> Result<i64, DiplomacyError> {
        let year = self.year_of(a)?;
        let bounds = self.bounds;
        Ok(self
            .relation_or_create(a, b)
            .apply(reason, amount, year, &bounds))
    }

    /// Move the score of a pair that must already have a record.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::RelationNotFound`] if the pair has no record.
    pub fn apply_existing_delta(
        &mut self,
        a: DynastyId,
        b: DynastyId,
        reason: &str,
        amount: i64,
    ) -> Result<i64, DiplomacyError> {
        if self.relation(a, b).is_none() {
            return Err(DiplomacyError::RelationNotFound(a, b));
        }
        self.apply_delta(a, b, reason, amount)
    }

    // -----------------------------------------------------------------------
    // Treaties
    // -----------------------------------------------------------------------

    /// Read a treaty.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::TreatyNotFound`] if it does not exist.
    pub fn treaty(&self, id: TreatyId) -> Result<&Treaty, DiplomacyError> {
        self.treaties
            .get(&id)
            .or_else(|| self.base.treaties.get(&id))
            .ok_or(DiplomacyError::TreatyNotFound(id))
    }

    /// Mutable access to a treaty.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::TreatyNotFound`] if it does not exist.
    pub fn treaty_mut(&mut self, id: TreatyId) -> Result<&mut Treaty, DiplomacyError> {
        match self.treaties.entry(id) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let committed = self
                    .base
                    .treaties
                    .get(&id)
                    .ok_or(DiplomacyError::TreatyNotFound(id))?;
                Ok(slot.insert(committed.clone()))
            }
        }
    }

    /// Stage a new treaty and link it to its relation record.
    pub fn insert_treaty(&mut self, treaty: Treaty) {
        let pair = treaty.pair;
        self.relation_or_create(pair.first(), pair.second())
            .treaty_ids
            .push(treaty.id);
        self.treaties.insert(treaty.id, treaty);
    }

    /// Ids of every treaty, in id order.
    pub fn treaty_ids(&self) -> Vec<TreatyId> {
        merged_keys(&self.base.treaties, &self.treaties)
    }

    /// Active treaties of a pair, in id order.
    pub fn active_treaties(&self, a: DynastyId, b: DynastyId) -> Vec<&Treaty> {
        let pair = DynastyPair::new(a, b);
        self.treaty_ids()
            .into_iter()
            .filter_map(|id| self.treaty(id).ok())
            .filter(|t| t.active && t.pair == pair)
            .collect()
    }

    /// The active treaty of `treaty_type` between a pair, if any.
    pub fn active_treaty_of_type(
        &self,
        a: DynastyId,
        b: DynastyId,
        treaty_type: TreatyType,
    ) -> Option<TreatyId> {
        self.active_treaties(a, b)
            .into_iter()
            .find(|t| t.treaty_type == treaty_type)
            .map(|t| t.id)
    }

    // -----------------------------------------------------------------------
    // Wars
    // -----------------------------------------------------------------------

    /// Read a war.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::WarNotFound`] if it does not exist.
    pub fn war(&self, id: WarId) -> Result<&War, DiplomacyError> {
        self.wars
            .get(&id)
            .or_else(|| self.base.wars.get(&id))
            .ok_or(DiplomacyError::WarNotFound(id))
    }

    /// Mutable access to a war.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::WarNotFound`] if it does not exist.
    pub fn war_mut(&mut self, id: WarId) -> Result<&mut War, DiplomacyError> {
        match self.wars.entry(id) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let committed = self
                    .base
                    .wars
                    .get(&id)
                    .ok_or(DiplomacyError::WarNotFound(id))?;
                Ok(slot.insert(committed.clone()))
            }
        }
    }

    /// Stage a new war.
    pub fn insert_war(&mut self, war: War) {
        self.wars.insert(war.id, war);
    }

    /// The active war between a pair, in either direction.
    pub fn active_war_between(&self, a: DynastyId, b: DynastyId) -> Option<&War> {
        let pair = DynastyPair::new(a, b);
        merged_keys(&self.base.wars, &self.wars)
            .into_iter()
            .filter_map(|id| self.war(id).ok())
            .find(|w| w.active && w.pair() == pair)
    }

    // -----------------------------------------------------------------------
    // Gold
    // -----------------------------------------------------------------------

    /// Move war reparations from `payer` to `payee` and stage the entry.
    ///
    /// The entry is dated in the payer's year. The caller clamps `amount`
    /// to what the payer holds.
    ///
    /// # Errors
    ///
    /// Returns a ledger error for a non-positive amount or a self-transfer,
    /// and [`DiplomacyError::ArithmeticOverflow`] if a treasury would go
    /// negative or overflow.
    pub fn transfer_reparations(
        &mut self,
        payer: DynastyId,
        payee: DynastyId,
        amount: Decimal,
        war_id: WarId,
    ) -> Result<LedgerEntry, DiplomacyError> {
        self.move_gold(payer, payee, amount, |ledger, year| {
            ledger.record_reparations(year, payer, payee, amount, war_id)
        })
    }

    /// Move tribute from `vassal` to `overlord` and stage the entry.
    ///
    /// # Errors
    ///
    /// As for [`Transaction::transfer_reparations`].
    pub fn transfer_tribute(
        &mut self,
        vassal: DynastyId,
        overlord: DynastyId,
        amount: Decimal,
        treaty_id: TreatyId,
    ) -> Result<LedgerEntry, DiplomacyError> {
        self.move_gold(vassal, overlord, amount, |ledger, year| {
            ledger.record_tribute(year, vassal, overlord, amount, treaty_id)
        })
    }

    fn move_gold(
        &mut self,
        payer: DynastyId,
        payee: DynastyId,
        amount: Decimal,
        record: impl FnOnce(&mut Ledger, u32) -> Result<&LedgerEntry, LedgerError>,
    ) -> Result<LedgerEntry, DiplomacyError> {
        let year = self.year_of(payer)?;
        let remaining = self
            .dynasty(payer)?
            .wealth
            .checked_sub(amount)
            .filter(|w| !w.is_sign_negative())
            .ok_or_else(|| DiplomacyError::overflow("payment exceeds payer treasury"))?;
        let payee_wealth = self
            .dynasty(payee)?
            .wealth
            .checked_add(amount)
            .ok_or_else(|| DiplomacyError::overflow("payee treasury"))?;

        let entry = record(&mut self.ledger, year)?.clone();
        self.dynasty_mut(payer)?.wealth = remaining;
        self.dynasty_mut(payee)?.wealth = payee_wealth;
        Ok(entry)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Stage an event, dated in its recipient's current year.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::DynastyNotFound`] if the recipient is unknown.
    pub fn emit(&mut self, notice: Notice) -> Result<(), DiplomacyError> {
        let year = self.year_of(notice.recipient())?;
        self.events.push(notice.into_event(year));
        Ok(())
    }
}

fn merged_keys<K: Ord + Copy, V>(base: &BTreeMap<K, V>, overlay: &BTreeMap<K, V>) -> Vec<K> {
    base.keys()
        .chain(overlay.keys())
        .copied()
        .collect::<BTreeSet<K>>()
        .into_iter()
        .collect()
}
