//! Behavioural properties of the diplomacy core, exercised through the
//! public [`Diplomacy`] facade.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use concord_diplomacy::{
    Diplomacy, DiplomacyConfig, DiplomacyError, DiplomacyState, EventLog, FixedFortune, Fortune,
    PlotOutcome, RelationConfig, RngFortune, TermOutcome,
};
use concord_types::{
    ActionKind, Dynasty, DynastyId, EventType, PeaceTerms, RelationStatus, Territory, TerritoryId,
    TreatyType, WarGoal,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;
use serde_json::Value;

fn seeded_state(score: i64) -> (DiplomacyState, DynastyId, DynastyId) {
    let mut state = DiplomacyState::new();
    let a = state.register_dynasty(Dynasty::new("Plantagenet"));
    let b = state.register_dynasty(Dynasty::new("Capet"));
    if score != 0 {
        state
            .relations_mut()
            .get_or_create(a, b)
            .apply("seed", score, 1, &RelationConfig::default());
    }
    (state, a, b)
}

fn core_with<F: Fortune>(state: DiplomacyState, fortune: F) -> Diplomacy<EventLog, F> {
    Diplomacy::with_state(state, DiplomacyConfig::default(), EventLog::new(), fortune)
}

fn fresh() -> (Diplomacy<EventLog, FixedFortune>, DynastyId, DynastyId) {
    let (state, a, b) = seeded_state(0);
    (core_with(state, FixedFortune::NEVER), a, b)
}

#[test]
fn lookup_order_does_not_matter() {
    let (mut core, a, b) = fresh();
    core.perform_action(a, b, ActionKind::Insult, &Value::Null).unwrap();

    let forward = core.state().relations().get(a, b).cloned();
    let backward = core.state().relations().get(b, a).cloned();
    assert!(forward.is_some());
    assert_eq!(forward, backward);
}

#[test]
fn status_bands_are_exact_at_boundaries() {
    assert_eq!(RelationStatus::from_score(75), RelationStatus::Allied);
    assert_eq!(RelationStatus::from_score(74), RelationStatus::Friendly);
    assert_eq!(RelationStatus::from_score(-25), RelationStatus::Neutral);
    assert_eq!(RelationStatus::from_score(-26), RelationStatus::Unfriendly);
}

#[test]
fn creating_a_relation_twice_yields_one_record() {
    let (mut core, a, b) = fresh();
    let first = core.relation(a, b, true).cloned().expect("created");
    let second = core.relation(b, a, true).cloned().expect("found");
    assert_eq!(first, second);
    assert_eq!(core.state().relations().len(), 1);
}

#[test]
fn military_alliance_requires_fifty() {
    let (state, a, b) = seeded_state(49);
    let mut core = core_with(state, FixedFortune::NEVER);
    let rejected = core.create_treaty(a, b, TreatyType::MilitaryAlliance, None, None);
    assert!(matches!(
        rejected,
        Err(DiplomacyError::InsufficientRelation {
            required: 50,
            actual: 49,
            ..
        })
    ));

    let (state, a, b) = seeded_state(50);
    let mut core = core_with(state, FixedFortune::NEVER);
    let signed = core
        .create_treaty(a, b, TreatyType::MilitaryAlliance, None, None)
        .unwrap();
    assert!(signed.success);
    assert_eq!(core.active_treaties_between(a, b).len(), 1);
}

#[test]
fn second_active_treaty_of_a_type_is_rejected() {
    let (mut core, a, b) = fresh();
    core.create_treaty(a, b, TreatyType::TradeAgreement, Some(10), None)
        .unwrap();
    let duplicate = core.create_treaty(b, a, TreatyType::TradeAgreement, None, None);
    assert!(matches!(
        duplicate,
        Err(DiplomacyError::DuplicateActiveTreaty {
            treaty_type: TreatyType::TradeAgreement,
            ..
        })
    ));
    assert_eq!(core.active_treaties_between(a, b).len(), 1);
}

#[test]
fn war_voids_non_aggression_pact() {
    let (mut core, a, b) = fresh();
    let pact = core
        .create_treaty(a, b, TreatyType::NonAggression, None, None)
        .unwrap()
        .payload
        .unwrap();

    let war = core
        .declare_war(a, b, WarGoal::Humiliation, None)
        .unwrap()
        .payload
        .unwrap();

    assert!(!core.treaty(pact.id).unwrap().active);
    assert!(core.war(war.id).unwrap().active);
    assert_eq!(core.active_war_between(b, a).map(|w| w.id), Some(war.id));
}

#[test]
fn failed_declaration_rolls_back_the_broken_pact() {
    let (mut state, a, b) = seeded_state(0);
    let own = state.register_territory(Territory {
        id: TerritoryId::new(),
        name: "Gascony".to_owned(),
        controller: Some(a),
    });
    let mut core = core_with(state, FixedFortune::NEVER);
    let pact = core
        .create_treaty(a, b, TreatyType::NonAggression, None, None)
        .unwrap()
        .payload
        .unwrap();
    let events_before = core.sink().len();

    // The pact is broken first inside the transaction, then the conquest
    // target check fails.
    let result = core.declare_war(a, b, WarGoal::Conquest, Some(own));
    assert!(matches!(result, Err(DiplomacyError::InvalidConquestTarget { .. })));

    assert!(core.treaty(pact.id).unwrap().active);
    assert_eq!(core.dynasty(a).unwrap().honor, 50);
    assert_eq!(core.status(a, b).payload.unwrap().score, 5);
    assert_eq!(core.sink().len(), events_before);
    assert!(core.active_war_between(a, b).is_none());
}

#[test]
fn peace_needs_fifty_war_score() {
    for (score, accepted) in [(49, false), (50, true)] {
        let (mut core, a, b) = fresh();
        let war = core
            .declare_war(a, b, WarGoal::Tribute, None)
            .unwrap()
            .payload
            .unwrap();
        core.set_war_score(war.id, score, 0).unwrap();

        let result = core.negotiate_peace(war.id, true, &PeaceTerms::default());
        assert_eq!(result.is_ok(), accepted, "war score {score}");
        assert_eq!(core.war(war.id).unwrap().active, !accepted);
        if !accepted {
            assert!(matches!(
                result,
                Err(DiplomacyError::InsufficientWarScore { actual: 49, .. })
            ));
        }
    }
}

#[test]
fn assassination_takes_exactly_one_branch() {
    for (fortune, expected) in [
        (FixedFortune::ALWAYS, PlotOutcome::Succeeded),
        (FixedFortune::NEVER, PlotOutcome::Discovered),
    ] {
        let (state, a, b) = seeded_state(0);
        let mut core = core_with(state, fortune);
        let outcome = core
            .perform_action(a, b, ActionKind::Assassinate, &Value::Null)
            .unwrap();
        let report = outcome.payload.unwrap();
        assert_eq!(report.plot, Some(expected));

        let target_heard = core
            .sink()
            .for_dynasty(b)
            .iter()
            .any(|e| e.event_type == EventType::PlotDiscovered);
        let actor = core.dynasty(a).unwrap();
        match expected {
            PlotOutcome::Succeeded => {
                assert!(outcome.success);
                assert!(!target_heard);
                assert_eq!((actor.infamy, actor.honor), (10, 45));
                assert_eq!(report.score, -30);
            }
            PlotOutcome::Discovered => {
                assert!(!outcome.success);
                assert!(target_heard);
                assert_eq!((actor.infamy, actor.honor), (20, 40));
                assert_eq!(report.score, -80);
            }
        }
    }
}

#[test]
fn seeded_plots_never_mix_branches() {
    for seed in 0..32 {
        let (state, a, b) = seeded_state(0);
        let mut core = core_with(state, RngFortune::new(SmallRng::seed_from_u64(seed)));
        core.perform_action(a, b, ActionKind::Assassinate, &Value::Null)
            .unwrap();

        let executed = core.sink().of_type(EventType::PlotExecuted).len();
        let discovered = core.sink().of_type(EventType::PlotDiscovered).len();
        assert!(
            (executed, discovered) == (1, 0) || (executed, discovered) == (0, 2),
            "seed {seed}: executed {executed}, discovered {discovered}"
        );
        assert!(core.sink().of_type(EventType::ActionTaken).is_empty());
    }
}

#[test]
fn reparations_clamp_to_payer_wealth() {
    let (mut state, a, b) = seeded_state(0);
    let mut loser = state.dynasty(b).cloned().unwrap();
    loser.wealth = Decimal::from(120);
    state.register_dynasty(loser);
    let mut core = core_with(state, FixedFortune::NEVER);

    let war = core
        .declare_war(a, b, WarGoal::Tribute, None)
        .unwrap()
        .payload
        .unwrap();
    core.set_war_score(war.id, 75, 0).unwrap();
    let terms = PeaceTerms {
        gold: Some(Decimal::from(500)),
        ..PeaceTerms::default()
    };
    let settlement = core
        .negotiate_peace(war.id, true, &terms)
        .unwrap()
        .payload
        .unwrap();

    assert_eq!(
        settlement.gold,
        TermOutcome::Partial {
            requested: Decimal::from(500),
            paid: Decimal::from(120),
        }
    );
    assert_eq!(core.dynasty(b).unwrap().wealth, Decimal::ZERO);
    assert_eq!(core.dynasty(a).unwrap().wealth, Decimal::from(120));
    assert_eq!(core.ledger().dynasty_balance(a), Decimal::from(120));
}

#[test]
fn envoy_pact_then_war_end_to_end() {
    let (mut core, a, b) = fresh();

    let envoy = core
        .perform_action_named(a, b, "send_envoy", &Value::Null)
        .unwrap();
    assert!(envoy.success);
    assert_eq!(core.status(a, b).payload.unwrap().score, 5);

    let pact = core
        .create_treaty(a, b, TreatyType::NonAggression, None, None)
        .unwrap()
        .payload
        .unwrap();

    let war = core
        .declare_war(a, b, WarGoal::Conquest, None)
        .unwrap()
        .payload
        .unwrap();
    assert!(war.active);
    assert!(!core.treaty(pact.id).unwrap().active);

    // 5 (envoy) + 5 (pact signing bonus) - 20 (pact broken) - 40 (war).
    assert_eq!(core.status(a, b).payload.unwrap().score, -50);

    let history: Vec<&str> = core
        .state()
        .relations()
        .get(a, b)
        .unwrap()
        .history
        .iter()
        .map(|c| c.reason.as_str())
        .collect();
    assert_eq!(
        history,
        vec!["send_envoy", "treaty_signed", "break_treaty", "declare_war"]
    );
}
