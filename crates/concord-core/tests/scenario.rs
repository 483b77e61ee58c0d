//! Runs the bundled scenario files end to end.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::path::{Path, PathBuf};

use concord_core::{Scenario, ScenarioRunner, SimulationConfig};
use concord_types::{EventType, RelationStatus};
use rust_decimal::Decimal;

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn load(name: &str) -> (SimulationConfig, Scenario) {
    let root = project_root();
    let config = SimulationConfig::from_file(&root.join("concord-config.yaml")).expect("config");
    let scenario = Scenario::from_file(&root.join("scenarios").join(name)).expect("scenario");
    (config, scenario)
}

#[test]
fn hundred_years_plays_out() {
    let (config, scenario) = load("hundred_years.yaml");
    let runner = ScenarioRunner::new(&config, &scenario).unwrap();
    let plantagenet = runner.dynasty_id("Plantagenet").unwrap();
    let valois = runner.dynasty_id("Valois").unwrap();
    let calais = runner.territory_id("Calais").unwrap();

    let mut runner = runner;
    let mut reports = Vec::new();
    for step in &scenario.steps {
        reports.push(runner.run_step(step).unwrap());
    }
    assert!(reports.iter().all(|o| o.success), "{reports:#?}");

    let core = runner.core();
    // Envoy 5, pact +5, insult -8, pact broken -20, war -40, peace +10.
    let status = core.status(valois, plantagenet).payload.unwrap();
    assert_eq!(status.score, -48);
    assert_eq!(status.status, RelationStatus::Unfriendly);

    assert_eq!(core.territory(calais).unwrap().controller, Some(plantagenet));
    // Reparations of 300 clamp to Valois' 250; tribute on an empty treasury is skipped.
    assert_eq!(core.dynasty(valois).unwrap().wealth, Decimal::ZERO);
    assert_eq!(core.dynasty(plantagenet).unwrap().wealth, Decimal::from(650));
    assert_eq!(core.ledger().len(), 1);

    let peace = reports[6].payload.as_ref().unwrap();
    assert_eq!(peace["gold"]["status"], "partial");
    assert_eq!(peace["territory"]["status"], "applied");
    assert_eq!(peace["vassalization"]["status"], "applied");

    let expired = reports[8].payload.as_ref().unwrap().as_array().unwrap().len();
    assert_eq!(expired, 1);

    let events = core.sink().events();
    assert_eq!(events.len(), 22);
    assert!(
        events
            .iter()
            .filter(|e| e.event_type == EventType::TreatyExpired)
            .all(|e| e.year == 1340)
    );
    assert!(
        events
            .iter()
            .filter(|e| e.event_type == EventType::WarDeclared)
            .all(|e| e.year == 1337)
    );
}

#[test]
fn run_collects_every_step_and_event() {
    let (config, scenario) = load("hundred_years.yaml");
    let report = ScenarioRunner::new(&config, &scenario)
        .unwrap()
        .run(&scenario)
        .unwrap();

    assert_eq!(report.name, "Hundred Years");
    assert_eq!(report.seed, 1337);
    assert_eq!(report.steps.len(), scenario.steps.len());
    assert_eq!(report.failures(), 0);
    assert_eq!(report.events.len(), 22);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["steps"][4]["op"], "declare_war");
}

#[test]
fn scenario_seed_wins_over_config() {
    let (mut config, scenario) = load("hundred_years.yaml");
    config.scenario.seed = 9;
    let report = ScenarioRunner::new(&config, &scenario)
        .unwrap()
        .run(&Scenario::parse("{}").unwrap())
        .unwrap();
    assert_eq!(report.seed, 1337);
    assert!(report.steps.is_empty());
}
