//! The diplomacy facade handed to turn orchestrators.
//!
//! [`Diplomacy`] owns the committed state, the tunables, the event sink and
//! the randomness source. Every mutating operation runs in its own
//! [`Transaction`]: on `Ok` the overlay is committed and the staged events
//! are flushed to the sink; on `Err` the overlay is dropped.

use std::collections::BTreeSet;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info, warn};

use concord_ledger::{ConservationResult, Ledger};
use concord_types::{
    ActionKind, Dynasty, DynastyId, LedgerEntry, PeaceTerms, RelationStatus, Territory, TerritoryId,
    Treaty, TreatyId, TreatyTerms, TreatyType, War, WarGoal, WarId,
};

use crate::actions::{self, ActionReport};
use crate::config::DiplomacyConfig;
use crate::error::DiplomacyError;
use crate::events::EventSink;
use crate::fortune::Fortune;
use crate::outcome::Outcome;
use crate::peace::{self, PeaceSettlement};
use crate::relations::RelationRecord;
use crate::state::DiplomacyState;
use crate::transaction::Transaction;
use crate::{treaties, war};

/// Banded reading of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelationReading {
    /// Band of the score, `Unknown` if the pair has no record.
    pub status: RelationStatus,
    /// Current score, 0 if the pair has no record.
    pub score: i64,
}

/// The diplomacy core.
#[derive(Debug)]
pub struct Diplomacy<S, F> {
    state: DiplomacyState,
    config: DiplomacyConfig,
    sink: S,
    fortune: F,
}

impl<S: EventSink, F: Fortune> Diplomacy<S, F> {
    /// Create a core over an empty state.
    pub const fn new(config: DiplomacyConfig, sink: S, fortune: F) -> Self {
        Self::with_state(DiplomacyState::new(), config, sink, fortune)
    }

    /// Create a core over an existing state.
    pub const fn with_state(
        state: DiplomacyState,
        config: DiplomacyConfig,
        sink: S,
        fortune: F,
    ) -> Self {
        Self {
            state,
            config,
            sink,
            fortune,
        }
    }

    /// Run `op` in a fresh transaction; commit and publish on success.
    fn execute<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(
            &mut Transaction<'_>,
            &DiplomacyConfig,
            &mut F,
        ) -> Result<T, DiplomacyError>,
    ) -> Result<T, DiplomacyError> {
        let mut txn = Transaction::begin(&self.state, self.config.relations);
        let value = match op(&mut txn, &self.config, &mut self.fortune) {
            Ok(value) => value,
            Err(err) => {
                debug!(operation, error = %err, "Transaction rolled back");
                return Err(err);
            }
        };
        let changes = txn.into_changes();
        let events = self.state.commit(changes);
        debug!(operation, events = events.len(), "Transaction committed");
        for event in events {
            self.sink.record(event);
        }
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Directory
    // -----------------------------------------------------------------------

    /// Add or replace a dynasty.
    pub fn register_dynasty(&mut self, dynasty: Dynasty) -> DynastyId {
        self.state.register_dynasty(dynasty)
    }

    /// Add or replace a territory.
    pub fn register_territory(&mut self, territory: Territory) -> TerritoryId {
        self.state.register_territory(territory)
    }

    /// Look up a dynasty.
    pub fn dynasty(&self, id: DynastyId) -> Option<&Dynasty> {
        self.state.dynasty(id)
    }

    /// Look up a territory.
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.state.territory(id)
    }

    /// Look up a treaty.
    pub fn treaty(&self, id: TreatyId) -> Option<&Treaty> {
        self.state.treaty(id)
    }

    /// Look up a war.
    pub fn war(&self, id: WarId) -> Option<&War> {
        self.state.war(id)
    }

    /// Active treaties between two dynasties.
    pub fn active_treaties_between(&self, a: DynastyId, b: DynastyId) -> Vec<&Treaty> {
        self.state.active_treaties_between(a, b)
    }

    /// The active war between two dynasties, in either direction.
    pub fn active_war_between(&self, a: DynastyId, b: DynastyId) -> Option<&War> {
        self.state.active_war_between(a, b)
    }

    /// The relation record of a pair, optionally created with a neutral score.
    pub fn relation(
        &mut self,
        a: DynastyId,
        b: DynastyId,
        create_if_missing: bool,
    ) -> Option<&RelationRecord> {
        self.state.relations_mut().get_with(a, b, create_if_missing)
    }

    /// Band and score of a pair. Never creates a record.
    pub fn status(&self, a: DynastyId, b: DynastyId) -> Outcome<RelationReading> {
        let (status, score) = self.state.relations().status(a, b);
        Outcome::success(
            format!("relation is {} ({score})", status.label()),
            RelationReading { status, score },
        )
    }

    /// The gold ledger.
    pub const fn ledger(&self) -> &Ledger {
        self.state.ledger()
    }

    /// The committed state.
    pub const fn state(&self) -> &DiplomacyState {
        &self.state
    }

    /// The tunables in force.
    pub const fn config(&self) -> &DiplomacyConfig {
        &self.config
    }

    /// The event sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the event sink.
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Perform a diplomatic action.
    pub fn perform_action(
        &mut self,
        actor: DynastyId,
        target: DynastyId,
        kind: ActionKind,
        data: &serde_json::Value,
    ) -> Result<Outcome<ActionReport>, DiplomacyError> {
        self.execute("perform_action", |txn, config, fortune| {
            actions::perform_action(txn, config, fortune, actor, target, kind, data)
        })
    }

    /// Perform a diplomatic action named by its `snake_case` label.
    pub fn perform_action_named(
        &mut self,
        actor: DynastyId,
        target: DynastyId,
        label: &str,
        data: &serde_json::Value,
    ) -> Result<Outcome<ActionReport>, DiplomacyError> {
        let kind: ActionKind = label.parse().map_err(|err: concord_types::UnknownActionKind| {
            DiplomacyError::InvalidActionKind(err.0)
        })?;
        self.perform_action(actor, target, kind, data)
    }

    // -----------------------------------------------------------------------
    // Treaties
    // -----------------------------------------------------------------------

    /// Sign a treaty between `a` and `b`.
    pub fn create_treaty(
        &mut self,
        a: DynastyId,
        b: DynastyId,
        treaty_type: TreatyType,
        duration: Option<u32>,
        terms: Option<TreatyTerms>,
    ) -> Result<Outcome<Treaty>, DiplomacyError> {
        self.execute("create_treaty", |txn, _, _| {
            treaties::create_treaty(txn, a, b, treaty_type, duration, terms)
        })
        .map(|treaty| Outcome::success(format!("{} signed", treaty_type.label()), treaty))
    }

    /// Break an active treaty on behalf of `breaker`.
    pub fn break_treaty(
        &mut self,
        treaty_id: TreatyId,
        breaker: DynastyId,
    ) -> Result<Outcome<Treaty>, DiplomacyError> {
        self.execute("break_treaty", |txn, config, _| {
            treaties::break_treaty(txn, config, treaty_id, breaker)
        })
        .map(|treaty| Outcome::success(format!("{} broken", treaty.treaty_type.label()), treaty))
    }

    /// Deactivate every treaty whose term has run out by `year`.
    pub fn expire_treaties(&mut self, year: u32) -> Result<Outcome<Vec<Treaty>>, DiplomacyError> {
        self.execute("expire_treaties", |txn, _, _| treaties::expire_treaties(txn, year))
            .map(|expired| Outcome::success(format!("{} treaties expired", expired.len()), expired))
    }

    // -----------------------------------------------------------------------
    // War and peace
    // -----------------------------------------------------------------------

    /// Declare war on `defender`.
    pub fn declare_war(
        &mut self,
        attacker: DynastyId,
        defender: DynastyId,
        war_goal: WarGoal,
        target_territory: Option<TerritoryId>,
    ) -> Result<Outcome<War>, DiplomacyError> {
        self.execute("declare_war", |txn, config, _| {
            war::declare_war(txn, config, attacker, defender, war_goal, target_territory)
        })
        .map(|war| Outcome::success(format!("war of {} declared", war_goal.label()), war))
    }

    /// Record the latest war scores from the combat collaborator.
    pub fn set_war_score(
        &mut self,
        war_id: WarId,
        attacker_score: i64,
        defender_score: i64,
    ) -> Result<Outcome<War>, DiplomacyError> {
        self.execute("set_war_score", |txn, _, _| {
            war::set_war_score(txn, war_id, attacker_score, defender_score)
        })
        .map(|war| Outcome::success("war score updated", war))
    }

    /// Settle a war on the enforcing side's terms.
    pub fn negotiate_peace(
        &mut self,
        war_id: WarId,
        enforced_by_attacker: bool,
        terms: &PeaceTerms,
    ) -> Result<Outcome<PeaceSettlement>, DiplomacyError> {
        self.execute("negotiate_peace", |txn, config, _| {
            peace::negotiate_peace(txn, config, war_id, enforced_by_attacker, terms)
        })
        .map(|settlement| Outcome::success("peace signed", settlement))
    }

    /// Collect tribute from every vassal, then audit the gold movements.
    pub fn collect_tribute(&mut self) -> Result<Outcome<Vec<LedgerEntry>>, DiplomacyError> {
        let before = self.state.wealth_snapshot();
        let entries = self.execute("collect_tribute", |txn, _, _| peace::collect_tribute(txn))?;
        let after = self.state.wealth_snapshot();

        let years: BTreeSet<u32> = entries.iter().map(|e| e.year).collect();
        // The audit is per year; a round spanning several calendars is skipped.
        if let (Some(&year), 1) = (years.first(), years.len()) {
            let mut round = Ledger::new();
            for entry in &entries {
                round.append(entry.clone());
            }
            match round.verify_conservation(year, &before, &after) {
                ConservationResult::Balanced => debug!(year, "Tribute round balanced"),
                ConservationResult::Anomaly(anomaly) => {
                    warn!(%anomaly, "Tribute round failed conservation audit");
                }
            }
        }

        Ok(Outcome::success(
            format!("{} tribute payments collected", entries.len()),
            entries,
        ))
    }

    /// Set every dynasty's calendar year.
    pub fn advance_calendar(&mut self, year: u32) -> Result<Outcome<u32>, DiplomacyError> {
        self.execute("advance_calendar", |txn, _, _| {
            for id in txn.dynasty_ids() {
                txn.dynasty_mut(id)?.current_year = year;
            }
            Ok(())
        })?;
        info!(year, "Calendar advanced");
        Ok(Outcome::success(format!("calendar advanced to {year}"), year))
    }
}

/// A [`Diplomacy`] core shared between threads.
///
/// Every operation takes the lock for its whole transaction, so operations
/// on the same pair never interleave.
#[derive(Debug)]
pub struct SharedDiplomacy<S, F> {
    inner: Mutex<Diplomacy<S, F>>,
}

impl<S: EventSink, F: Fortune> SharedDiplomacy<S, F> {
    /// Wrap a core.
    pub const fn new(core: Diplomacy<S, F>) -> Self {
        Self {
            inner: Mutex::new(core),
        }
    }

    /// Run `f` with exclusive access to the core.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::StatePoisoned`] if a previous holder panicked,
    /// otherwise whatever `f` returns.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut Diplomacy<S, F>) -> Result<T, DiplomacyError>,
    ) -> Result<T, DiplomacyError> {
        let mut core = self.inner.lock().map_err(|_poisoned| DiplomacyError::StatePoisoned)?;
        f(&mut core)
    }

    /// Unwrap the core.
    ///
    /// # Errors
    ///
    /// Returns [`DiplomacyError::StatePoisoned`] if a holder panicked.
    pub fn into_inner(self) -> Result<Diplomacy<S, F>, DiplomacyError> {
        self.inner.into_inner().map_err(|_poisoned| DiplomacyError::StatePoisoned)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::events::EventLog;
    use crate::fortune::FixedFortune;
    use concord_types::EventType;

    type Core = Diplomacy<EventLog, FixedFortune>;

    fn core() -> (Core, DynastyId, DynastyId) {
        let mut core = Diplomacy::new(
            DiplomacyConfig::default(),
            EventLog::new(),
            FixedFortune::NEVER,
        );
        let a = core.register_dynasty(Dynasty::new("Wittelsbach"));
        let b = core.register_dynasty(Dynasty::new("Luxembourg"));
        (core, a, b)
    }

    #[test]
    fn committed_operation_publishes_events() {
        let (mut core, a, b) = core();
        let outcome = core.perform_action(a, b, ActionKind::SendEnvoy, &serde_json::Value::Null);
        assert!(matches!(&outcome, Ok(o) if o.success));
        assert_eq!(core.sink().len(), 2);
        assert_eq!(core.status(a, b).payload.map(|r| r.score), Some(5));
    }

    #[test]
    fn rejected_operation_publishes_nothing() {
        let (mut core, a, b) = core();
        let result = core.create_treaty(a, b, TreatyType::MilitaryAlliance, None, None);
        assert!(matches!(result, Err(DiplomacyError::InsufficientRelation { .. })));
        assert!(core.sink().is_empty());
        assert!(core.active_treaties_between(a, b).is_empty());
    }

    #[test]
    fn status_of_unknown_pair_creates_nothing() {
        let (core, a, b) = core();
        let reading = core.status(a, b).payload;
        assert_eq!(
            reading,
            Some(RelationReading {
                status: RelationStatus::Unknown,
                score: 0
            })
        );
        assert!(core.state().relations().is_empty());
    }

    #[test]
    fn named_actions_resolve_labels() {
        let (mut core, a, b) = core();
        assert!(core.perform_action_named(a, b, "insult", &serde_json::Value::Null).is_ok());
        let unknown = core.perform_action_named(a, b, "serenade", &serde_json::Value::Null);
        assert_eq!(
            unknown.err(),
            Some(DiplomacyError::InvalidActionKind("serenade".to_owned()))
        );
    }

    #[test]
    fn discovered_plot_is_committed_but_unsuccessful() {
        let (mut core, a, b) = core();
        let outcome =
            core.perform_action(a, b, ActionKind::Assassinate, &serde_json::Value::Null);
        assert!(matches!(&outcome, Ok(o) if !o.success));
        assert_eq!(core.sink().of_type(EventType::PlotDiscovered).len(), 2);
        assert_eq!(core.dynasty(a).map(|d| d.infamy), Some(20));
    }

    #[test]
    fn calendar_dates_later_events() {
        let (mut core, a, b) = core();
        assert!(core.advance_calendar(1453).is_ok());
        assert!(core.perform_action(a, b, ActionKind::Gift, &serde_json::Value::Null).is_ok());
        assert!(core.sink().events().iter().all(|e| e.year == 1453));
    }

    #[test]
    fn tribute_is_collected_and_recorded() {
        let (mut core, a, b) = core();
        core.state.dynasties.get_mut(&b).unwrap().wealth = Decimal::from(200);
        let war = core.declare_war(a, b, WarGoal::Subjugation, None).unwrap();
        let war_id = war.payload.unwrap().id;
        core.set_war_score(war_id, 80, 0).unwrap();
        let terms = PeaceTerms {
            vassalize: true,
            ..PeaceTerms::default()
        };
        core.negotiate_peace(war_id, true, &terms).unwrap();

        let collected = core.collect_tribute().unwrap();
        assert_eq!(collected.payload.map(|e| e.len()), Some(1));
        assert_eq!(core.ledger().len(), 1);
        assert_eq!(core.dynasty(a).map(|d| d.wealth), Some(Decimal::from(20)));
    }

    #[test]
    fn shared_core_serializes_access() {
        let (core, a, b) = core();
        let shared = Arc::new(SharedDiplomacy::new(core));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    shared.with(|core| {
                        core.perform_action(a, b, ActionKind::SendEnvoy, &serde_json::Value::Null)
                    })
                })
            })
            .collect();
        for handle in handles {
            assert!(matches!(handle.join(), Ok(Ok(_))));
        }
        let core = Arc::try_unwrap(shared)
            .ok()
            .unwrap()
            .into_inner()
            .unwrap();
        assert_eq!(core.status(a, b).payload.map(|r| r.score), Some(20));
    }
}
