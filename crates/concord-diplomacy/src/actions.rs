//! The action engine: discrete diplomatic actions as relation deltas.
//!
//! # Magnitude
//!
//! Each [`ActionKind`] has a signed base magnitude. Two multiplicative
//! modifiers are applied in order, then the result is truncated toward zero:
//!
//! | Modifier | Applies when | Factor |
//! |----------|--------------|--------|
//! | Honor | kind is honor-sensitive and actor honor < 50 | `1 + (50 - honor) / 50` |
//! | Prestige | actor prestige > target prestige | `1 + (gap / 100) * 0.5` |
//!
//! # Plots
//!
//! `Assassinate` applies its base delta, then rolls a Bernoulli trial. A
//! discovered plot costs the actor infamy and honor, sours the relation
//! further and is revealed to both sides. A successful plot is known only to
//! the actor. Both branches replace the ordinary paired log.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{debug, info, warn};

use concord_types::{ActionKind, DynastyId, EventType, RelationStatus};

use crate::config::DiplomacyConfig;
use crate::error::DiplomacyError;
use crate::events::Notice;
use crate::fortune::{Fortune, assassination_odds};
use crate::outcome::Outcome;
use crate::transaction::Transaction;

/// Honor below which honor-sensitive actions are amplified.
const HONOR_PIVOT: i64 = 50;

/// Relation change reason for a discovered plot.
const FAILED_ASSASSINATION: &str = "failed_assassination";

/// How a plot ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotOutcome {
    /// The plot succeeded and stayed secret.
    Succeeded,
    /// The plot was discovered.
    Discovered,
}

/// Payload of a performed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    /// The action performed.
    pub kind: ActionKind,
    /// The acting dynasty.
    pub actor: DynastyId,
    /// The target dynasty.
    pub target: DynastyId,
    /// Modified magnitude applied to the relation.
    pub delta: i64,
    /// Relation score after the action.
    pub score: i64,
    /// Relation band after the action.
    pub status: RelationStatus,
    /// Plot result, for assassinations.
    pub plot: Option<PlotOutcome>,
}

/// Compute the modified magnitude of `kind` performed by an actor with
/// `actor_honor`/`actor_prestige` against a target with `target_prestige`.
///
/// # Errors
///
/// Returns [`DiplomacyError::ArithmeticOverflow`] if an intermediate value
/// does not fit.
pub fn action_magnitude(
    kind: ActionKind,
    actor_honor: i64,
    actor_prestige: i64,
    target_prestige: i64,
) -> Result<i64, DiplomacyError> {
    let overflow = || DiplomacyError::overflow(format!("magnitude of {}", kind.label()));
    let mut magnitude = Decimal::from(kind.base_magnitude());

    if kind.is_honor_sensitive() && actor_honor < HONOR_PIVOT {
        let deficit = Decimal::from(HONOR_PIVOT.saturating_sub(actor_honor));
        let factor = deficit
            .checked_div(Decimal::from(HONOR_PIVOT))
            .and_then(|d| Decimal::ONE.checked_add(d))
            .ok_or_else(overflow)?;
        magnitude = magnitude.checked_mul(factor).ok_or_else(overflow)?;
    }

    if actor_prestige > target_prestige {
        let gap = Decimal::from(actor_prestige.saturating_sub(target_prestige));
        let factor = gap
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|d| d.checked_mul(Decimal::new(5, 1)))
            .and_then(|d| Decimal::ONE.checked_add(d))
            .ok_or_else(overflow)?;
        magnitude = magnitude.checked_mul(factor).ok_or_else(overflow)?;
    }

    magnitude.trunc().to_i64().ok_or_else(overflow)
}

/// Perform `kind` by `actor` against `target` inside `txn`.
///
/// `data` is an opaque payload copied into the event details.
pub fn perform_action(
    txn: &mut Transaction<'_>,
    config: &DiplomacyConfig,
    fortune: &mut dyn Fortune,
    actor: DynastyId,
    target: DynastyId,
    kind: ActionKind,
    data: &serde_json::Value,
) -> Result<Outcome<ActionReport>, DiplomacyError> {
    if actor == target {
        return Err(DiplomacyError::SelfDiplomacy(actor));
    }
    let actor_rec = txn.dynasty(actor)?;
    let target_rec = txn.dynasty(target)?;
    let delta = action_magnitude(kind, actor_rec.honor, actor_rec.prestige, target_rec.prestige)?;
    let odds = assassination_odds(config, actor_rec, target_rec);
    let actor_name = actor_rec.name.clone();
    let target_name = target_rec.name.clone();

    let score = txn.apply_delta(actor, target, kind.label(), delta)?;
    let mut report = ActionReport {
        kind,
        actor,
        target,
        delta,
        score,
        status: RelationStatus::from_score(score),
        plot: None,
    };
    let details = serde_json::json!({
        "action": kind.label(),
        "delta": delta,
        "score": score,
        "data": data,
    });

    match kind {
        ActionKind::Assassinate => {
            if fortune.roll(odds) {
                plot_succeeded(txn, config, &mut report, &target_name, details)
            } else {
                plot_discovered(txn, config, &mut report, &actor_name, &target_name, details)
            }
        }
        _ => {
            if kind == ActionKind::DeclareRivalry {
                let actor_mut = txn.dynasty_mut(actor)?;
                actor_mut.infamy = actor_mut.infamy.saturating_add(config.actions.rivalry_infamy);
            }

            let (actor_text, target_text) = narrate(kind, &actor_name, &target_name);
            txn.emit(
                Notice::new(actor, EventType::ActionTaken, actor_text).details(details.clone()),
            )?;
            txn.emit(
                Notice::new(target, EventType::ActionReceived, target_text).details(details),
            )?;

            info!(
                actor = %actor,
                target = %target,
                action = kind.label(),
                delta,
                score,
                "Diplomatic action performed"
            );
            Ok(Outcome::success(
                format!("{} performed against {target_name}", kind.label()),
                report,
            ))
        }
    }
}

fn plot_succeeded(
    txn: &mut Transaction<'_>,
    config: &DiplomacyConfig,
    report: &mut ActionReport,
    target_name: &str,
    details: serde_json::Value,
) -> Result<Outcome<ActionReport>, DiplomacyError> {
    let actor = txn.dynasty_mut(report.actor)?;
    actor.infamy = actor.infamy.saturating_add(config.assassination.success_infamy);
    actor.honor = actor.honor.saturating_sub(config.assassination.success_honor_loss);

    txn.emit(
        Notice::new(
            report.actor,
            EventType::PlotExecuted,
            format!("Our agents struck at the court of {target_name} and slipped away unseen."),
        )
        .details(details),
    )?;

    report.plot = Some(PlotOutcome::Succeeded);
    debug!(actor = %report.actor, target = %report.target, "Assassination plot succeeded");
    Ok(Outcome::success(
        format!("assassination against {target_name} succeeded"),
        report.clone(),
    ))
}

fn plot_discovered(
    txn: &mut Transaction<'_>,
    config: &DiplomacyConfig,
    report: &mut ActionReport,
    actor_name: &str,
    target_name: &str,
    details: serde_json::Value,
) -> Result<Outcome<ActionReport>, DiplomacyError> {
    let actor = txn.dynasty_mut(report.actor)?;
    actor.infamy = actor.infamy.saturating_add(config.assassination.failure_infamy);
    actor.honor = actor.honor.saturating_sub(config.assassination.failure_honor_loss);

    let penalty = config.assassination.failure_relation_penalty.saturating_neg();
    let score = txn.apply_delta(report.actor, report.target, FAILED_ASSASSINATION, penalty)?;
    report.score = score;
    report.status = RelationStatus::from_score(score);
    report.plot = Some(PlotOutcome::Discovered);

    txn.emit(
        Notice::new(
            report.actor,
            EventType::PlotDiscovered,
            format!("Our plot against {target_name} was uncovered. The whole court knows."),
        )
        .details(details.clone()),
    )?;
    txn.emit(
        Notice::new(
            report.target,
            EventType::PlotDiscovered,
            format!("We uncovered an assassination plot hatched by {actor_name}."),
        )
        .details(details),
    )?;

    warn!(actor = %report.actor, target = %report.target, score, "Assassination plot discovered");
    Ok(Outcome::failure(
        format!("assassination against {target_name} was discovered"),
        report.clone(),
    ))
}

/// Actor-side and target-side wording of an action.
fn narrate(kind: ActionKind, actor: &str, target: &str) -> (String, String) {
    match kind {
        ActionKind::SendEnvoy => (
            format!("We sent an envoy to the court of {target}."),
            format!("An envoy from {actor} arrived at our court."),
        ),
        ActionKind::ArrangeMarriage => (
            format!("We proposed a marriage alliance to {target}."),
            format!("{actor} proposed a marriage between our houses."),
        ),
        ActionKind::DeclareRivalry => (
            format!("We declared {target} our rival."),
            format!("{actor} has publicly named us their rival."),
        ),
        ActionKind::IssueUltimatum => (
            format!("We delivered an ultimatum to {target}."),
            format!("{actor} delivered an ultimatum to us."),
        ),
        ActionKind::BrokerPeace => (
            format!("We offered to mediate on behalf of {target}."),
            format!("{actor} offered to broker peace on our behalf."),
        ),
        ActionKind::SpreadRumors => (
            format!("Our agents spread rumors about the court of {target}."),
            "Unsettling rumors about our court are circulating.".to_owned(),
        ),
        ActionKind::BribeOfficials => (
            format!("We bribed officials at the court of {target}."),
            format!("Some of our officials have grown friendly towards {actor}."),
        ),
        ActionKind::InciteUnrest => (
            format!("Our agents stirred unrest in the lands of {target}."),
            "Unrest is spreading through our lands.".to_owned(),
        ),
        ActionKind::Assassinate => (
            format!("We plotted against the court of {target}."),
            format!("We suspect {actor} of plotting against us."),
        ),
        ActionKind::Gift => (
            format!("We sent lavish gifts to {target}."),
            format!("{actor} sent us lavish gifts."),
        ),
        ActionKind::Insult => (
            format!("We publicly insulted {target}."),
            format!("{actor} publicly insulted us."),
        ),
        ActionKind::DemandTribute => (
            format!("We demanded tribute from {target}."),
            format!("{actor} demands that we pay tribute."),
        ),
        ActionKind::OfferTribute => (
            format!("We offered tribute to {target}."),
            format!("{actor} offered us tribute."),
        ),
        ActionKind::DeclareWar => (
            format!("We announced hostile intent towards {target}."),
            format!("{actor} announced hostile intent towards us."),
        ),
        ActionKind::OfferPeace => (
            format!("We offered peace to {target}."),
            format!("{actor} offered us peace."),
        ),
        ActionKind::BreakTreaty => (
            format!("We repudiated our agreements with {target}."),
            format!("{actor} repudiated their agreements with us."),
        ),
        ActionKind::CulturalExchange => (
            format!("We sponsored a cultural exchange with {target}."),
            format!("{actor} sent scholars and artists to our court."),
        ),
        ActionKind::RoyalEducation => (
            format!("We sent a royal ward to be educated at the court of {target}."),
            format!("{actor} entrusted a royal ward to our court."),
        ),
    }
}

#[cfg(test)]
mod tests {
    use concord_types::Dynasty;

    use super::*;
    use crate::fortune::FixedFortune;
    use crate::state::DiplomacyState;

    fn setup() -> (DiplomacyState, DynastyId, DynastyId) {
        let mut state = DiplomacyState::new();
        let a = state.register_dynasty(Dynasty::new("Capet"));
        let b = state.register_dynasty(Dynasty::new("Plantagenet"));
        (state, a, b)
    }

    #[test]
    fn base_magnitude_without_modifiers() {
        assert_eq!(action_magnitude(ActionKind::SendEnvoy, 50, 50, 50), Ok(5));
        assert_eq!(action_magnitude(ActionKind::Insult, 10, 50, 50), Ok(-8));
    }

    #[test]
    fn low_honor_amplifies_sensitive_actions() {
        // -40 * (1 + 25/50) = -60
        assert_eq!(action_magnitude(ActionKind::DeclareWar, 25, 50, 50), Ok(-60));
        // -25 * (1 + 50/50) = -50
        assert_eq!(action_magnitude(ActionKind::BreakTreaty, 0, 50, 50), Ok(-50));
        // Honor at the pivot: no change.
        assert_eq!(action_magnitude(ActionKind::BreakTreaty, 50, 50, 50), Ok(-25));
    }

    #[test]
    fn prestige_gap_amplifies_and_truncates() {
        // 5 * (1 + 0.3 * 0.5) = 5.75 -> 5
        assert_eq!(action_magnitude(ActionKind::SendEnvoy, 50, 80, 50), Ok(5));
        // 10 * 1.15 = 11.5 -> 11
        assert_eq!(action_magnitude(ActionKind::ArrangeMarriage, 50, 80, 50), Ok(11));
        // -15 * 1.25 = -18.75 -> -18 (toward zero)
        assert_eq!(action_magnitude(ActionKind::InciteUnrest, 50, 100, 50), Ok(-18));
        // Lower prestige does not dampen.
        assert_eq!(action_magnitude(ActionKind::Gift, 50, 10, 90), Ok(8));
    }

    #[test]
    fn modifiers_compose() {
        // -40 * 1.5 * 1.1 = -66
        assert_eq!(action_magnitude(ActionKind::DeclareWar, 25, 70, 50), Ok(-66));
    }

    #[test]
    fn envoy_creates_relation_and_paired_events() {
        let (state, a, b) = setup();
        let config = DiplomacyConfig::default();
        let mut txn = Transaction::begin(&state, config.relations);
        let mut fortune = FixedFortune::NEVER;

        let result = perform_action(
            &mut txn,
            &config,
            &mut fortune,
            a,
            b,
            ActionKind::SendEnvoy,
            &serde_json::Value::Null,
        );
        assert!(matches!(&result, Ok(o) if o.success));
        assert_eq!(txn.score(b, a), 5);
        assert_eq!(txn.staged_events(), 2);
    }

    #[test]
    fn rivalry_adds_infamy() {
        let (state, a, b) = setup();
        let config = DiplomacyConfig::default();
        let mut txn = Transaction::begin(&state, config.relations);
        let mut fortune = FixedFortune::NEVER;

        let result = perform_action(
            &mut txn,
            &config,
            &mut fortune,
            a,
            b,
            ActionKind::DeclareRivalry,
            &serde_json::Value::Null,
        );
        assert!(result.is_ok());
        assert_eq!(txn.dynasty(a).map(|d| d.infamy), Ok(5));
        assert_eq!(txn.dynasty(b).map(|d| d.infamy), Ok(0));
    }

    #[test]
    fn self_target_is_rejected() {
        let (state, a, _) = setup();
        let config = DiplomacyConfig::default();
        let mut txn = Transaction::begin(&state, config.relations);
        let result = perform_action(
            &mut txn,
            &config,
            &mut FixedFortune::NEVER,
            a,
            a,
            ActionKind::Gift,
            &serde_json::Value::Null,
        );
        assert!(matches!(result, Err(DiplomacyError::SelfDiplomacy(_))));
    }

    #[test]
    fn unknown_actor_is_rejected_without_mutation() {
        let (state, _, b) = setup();
        let config = DiplomacyConfig::default();
        let mut txn = Transaction::begin(&state, config.relations);
        let ghost = DynastyId::new();
        let result = perform_action(
            &mut txn,
            &config,
            &mut FixedFortune::NEVER,
            ghost,
            b,
            ActionKind::Gift,
            &serde_json::Value::Null,
        );
        assert!(matches!(result, Err(DiplomacyError::DynastyNotFound(id)) if id == ghost));
        assert!(txn.relation(ghost, b).is_none());
        assert_eq!(txn.staged_events(), 0);
    }

    #[test]
    fn discovered_plot_penalizes_and_reports_failure() {
        let (state, a, b) = setup();
        let config = DiplomacyConfig::default();
        let mut txn = Transaction::begin(&state, config.relations);

        let result = perform_action(
            &mut txn,
            &config,
            &mut FixedFortune::NEVER,
            a,
            b,
            ActionKind::Assassinate,
            &serde_json::Value::Null,
        );
        assert!(matches!(&result, Ok(o) if !o.success));
        // -30 base, then -50 for the discovered plot.
        assert_eq!(txn.score(a, b), -80);
        assert_eq!(txn.dynasty(a).map(|d| (d.infamy, d.honor)), Ok((20, 40)));
        assert_eq!(txn.staged_events(), 2);
    }

    #[test]
    fn successful_plot_is_secret() {
        let (state, a, b) = setup();
        let config = DiplomacyConfig::default();
        let mut txn = Transaction::begin(&state, config.relations);

        let result = perform_action(
            &mut txn,
            &config,
            &mut FixedFortune::ALWAYS,
            a,
            b,
            ActionKind::Assassinate,
            &serde_json::Value::Null,
        );
        assert!(matches!(&result, Ok(o) if o.success));
        assert_eq!(txn.score(a, b), -30);
        assert_eq!(txn.dynasty(a).map(|d| (d.infamy, d.honor)), Ok((10, 45)));
        assert_eq!(txn.staged_events(), 1);
    }

    #[test]
    fn every_kind_has_distinct_perspectives() {
        for kind in ActionKind::ALL {
            let (actor_text, target_text) = narrate(kind, "Capet", "Plantagenet");
            assert_ne!(actor_text, target_text, "{kind:?}");
        }
    }
}
