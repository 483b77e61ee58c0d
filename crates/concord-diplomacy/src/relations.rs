//! Canonical relation records between dynasty pairs.
//!
//! There is exactly one [`RelationRecord`] per unordered pair. Every lookup
//! goes through [`DynastyPair`], which normalises the order, so `(a, b)` and
//! `(b, a)` always resolve to the same record. Records are created lazily
//! with a neutral score of 0 and never deleted.

use std::collections::BTreeMap;

use serde::Serialize;

use concord_types::{DynastyId, DynastyPair, RelationStatus, TreatyId};

use crate::config::RelationConfig;
use crate::error::DiplomacyError;

/// One entry of a relation's change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationChange {
    /// Why the score moved (`"send_envoy"`, `"treaty_signed"`, ...).
    pub reason: String,
    /// Change actually applied, after clamping.
    pub amount: i64,
    /// Score after the change.
    pub score_after: i64,
    /// Calendar year of the change.
    pub year: u32,
}

/// Bilateral sentiment between two dynasties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationRecord {
    /// The canonical pair.
    pub pair: DynastyPair,
    /// Current relation score.
    pub score: i64,
    /// Every treaty ever signed between the pair, active or not.
    pub treaty_ids: Vec<TreatyId>,
    /// Chronological log of score changes.
    pub history: Vec<RelationChange>,
}

impl RelationRecord {
    /// A fresh neutral record.
    pub const fn new(pair: DynastyPair) -> Self {
        Self {
            pair,
            score: 0,
            treaty_ids: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Banded reading of the current score.
    pub const fn status(&self) -> RelationStatus {
        RelationStatus::from_score(self.score)
    }

    /// Move the score by `amount`, clamped to `bounds`, and log the change.
    ///
    /// Returns the new score.
    pub fn apply(&mut self, reason: &str, amount: i64, year: u32, bounds: &RelationConfig) -> i64 {
        let before = self.score;
        let after = bounds.clamp(before.saturating_add(amount));
        self.score = after;
        self.history.push(RelationChange {
            reason: reason.to_owned(),
            amount: after.saturating_sub(before),
            score_after: after,
            year,
        });
        after
    }
}

/// The committed set of relation records.
#[derive(Debug, Clone, Default)]
pub struct RelationStore {
    records: BTreeMap<DynastyPair, RelationRecord>,
}

impl RelationStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// The record for a pair, in either order, if one exists.
    pub fn get(&self, a: DynastyId, b: DynastyId) -> Option<&RelationRecord> {
        self.records.get(&DynastyPair::new(a, b))
    }

    /// The record for a pair, created with a neutral score if absent.
    pub fn get_or_create(&mut self, a: DynastyId, b: DynastyId) -> &mut RelationRecord {
        let pair = DynastyPair::new(a, b);
        self.records
            .entry(pair)
            .or_insert_with(|| RelationRecord::new(pair))
    }

    /// Look up a pair, optionally creating its record.
    pub fn get_with(
        &mut self,
        a: DynastyId,
        b: DynastyId,
        create_if_missing: bool,
    ) -> Option<&RelationRecord> {
        if create_if_missing {
            Some(self.get_or_create(a, b))
        } else {
            self.get(a, b)
        }
    }

    /// Band and score for a pair. `(Unknown, 0)` when no record exists;
    /// never creates one.
    pub fn status(&self, a: DynastyId, b: DynastyId) -> (RelationStatus, i64) {
        self.get(a, b)
            .map_or((RelationStatus::Unknown, 0), |r| (r.status(), r.score))
    }

    /// Move an existing record's score.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::RelationNotFound`] if the pair has no record.
    pub fn apply_delta(
        &mut self,
        a: DynastyId,
        b: DynastyId,
        reason: &str,
        amount: i64,
        year: u32,
        bounds: &RelationConfig,
    ) -> Result<i64, DiplomacyError> {
        self.records
            .get_mut(&DynastyPair::new(a, b))
            .map(|record| record.apply(reason, amount, year, bounds))
            .ok_or(DiplomacyError::RelationNotFound(a, b))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over every record in canonical pair order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationRecord> {
        self.records.values()
    }

    /// Replace or insert a record staged by a committed transaction.
    pub(crate) fn upsert(&mut self, record: RelationRecord) {
        self.records.insert(record.pair, record);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_order_independent() {
        let a = DynastyId::new();
        let b = DynastyId::new();
        let mut store = RelationStore::new();
        store.get_or_create(a, b).score = 12;

        assert_eq!(store.get(b, a).map(|r| r.score), Some(12));
        assert_eq!(store.get(a, b), store.get(b, a));
    }

    #[test]
    fn creation_is_idempotent() {
        let a = DynastyId::new();
        let b = DynastyId::new();
        let mut store = RelationStore::new();
        assert!(store.get_with(a, b, true).is_some());
        assert!(store.get_with(b, a, true).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_without_create_leaves_store_untouched() {
        let mut store = RelationStore::new();
        assert!(store.get_with(DynastyId::new(), DynastyId::new(), false).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn status_of_missing_pair_is_unknown() {
        let store = RelationStore::new();
        let status = store.status(DynastyId::new(), DynastyId::new());
        assert_eq!(status, (RelationStatus::Unknown, 0));
        assert!(store.is_empty());
    }

    #[test]
    fn status_of_fresh_pair_is_neutral() {
        let a = DynastyId::new();
        let b = DynastyId::new();
        let mut store = RelationStore::new();
        store.get_or_create(a, b);
        assert_eq!(store.status(a, b), (RelationStatus::Neutral, 0));
    }

    #[test]
    fn apply_delta_requires_existing_record() {
        let a = DynastyId::new();
        let b = DynastyId::new();
        let mut store = RelationStore::new();
        let bounds = RelationConfig::default();
        let result = store.apply_delta(a, b, "gift", 8, 1, &bounds);
        assert!(matches!(result, Err(DiplomacyError::RelationNotFound(..))));
    }

    #[test]
    fn apply_delta_clamps_and_logs() {
        let a = DynastyId::new();
        let b = DynastyId::new();
        let mut store = RelationStore::new();
        let bounds = RelationConfig::default();
        store.get_or_create(a, b).score = 95;

        let result = store.apply_delta(b, a, "royal_marriage", 15, 1201, &bounds);
        assert_eq!(result, Ok(100));

        let r = store.get(a, b).unwrap();
        assert_eq!(r.history.len(), 1);
        assert_eq!(
            r.history.first(),
            Some(&RelationChange {
                reason: "royal_marriage".to_owned(),
                amount: 5,
                score_after: 100,
                year: 1201,
            })
        );
    }
}
