//! Scenario engine binary for the Concord diplomacy core.
//!
//! Loads configuration, runs one scenario file through the diplomacy core
//! and writes every delivered event to stdout as a JSON line.
//!
//! # Usage
//!
//! ```text
//! concord-engine [SCENARIO]
//! ```
//!
//! `SCENARIO` defaults to `scenarios/hundred_years.yaml`. The configuration
//! file is `concord-config.yaml`, or the path in `CONCORD_CONFIG`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration
//! 2. Initialize structured logging (tracing)
//! 3. Load the scenario and register its world
//! 4. Run every step
//! 5. Print the event log and a summary

mod error;

use std::io::Write;
use std::path::PathBuf;

use concord_core::{Scenario, ScenarioRunner, SimulationConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const DEFAULT_CONFIG: &str = "concord-config.yaml";
const DEFAULT_SCENARIO: &str = "scenarios/hundred_years.yaml";

fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = std::env::var("CONCORD_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config = SimulationConfig::from_file(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config);
    info!(
        config = %config_path.display(),
        seed = config.scenario.seed,
        "concord-engine starting"
    );

    // 3. Load the scenario.
    let scenario_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_SCENARIO), PathBuf::from);
    let scenario = Scenario::from_file(&scenario_path)?;
    let runner = ScenarioRunner::new(&config, &scenario)?;

    // 4. Run.
    let report = runner.run(&scenario)?;

    // 5. Print.
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in &report.events {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }
    out.flush()?;

    for step in report.steps.iter().filter(|s| !s.outcome.success) {
        warn!(
            index = step.index,
            op = step.op,
            message = %step.outcome.message,
            "Step did not succeed"
        );
    }
    info!(
        scenario = %report.name,
        steps = report.steps.len(),
        failures = report.failures(),
        events = report.events.len(),
        "concord-engine finished"
    );
    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &SimulationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
