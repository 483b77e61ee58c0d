//! Scenario runner.
//!
//! [`ScenarioRunner`] registers a scenario's dynasties and territories with a
//! fresh [`Diplomacy`] core, then executes each step in order. Every step
//! yields an [`Outcome`] whose payload is the JSON form of the entity it
//! created or changed.
//!
//! Name resolution failures abort the run; they mean the script itself is
//! wrong. Rejections from the diplomacy core are recorded as unsuccessful
//! steps and the run continues.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::{debug, info};

use concord_diplomacy::{Diplomacy, DiplomacyError, EventLog, Outcome, RngFortune};
use concord_types::{
    DiplomaticEvent, Dynasty, DynastyId, PeaceTerms, Territory, TerritoryId, TreatyTerms, War,
};

use crate::config::SimulationConfig;
use crate::scenario::{Scenario, Step};

/// The diplomacy core as driven by the runner.
pub type ScenarioCore = Diplomacy<EventLog, RngFortune<SmallRng>>;

/// Errors that abort a scenario run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step names a dynasty the scenario does not define.
    #[error("unknown dynasty: {0}")]
    UnknownDynasty(String),

    /// A step names a territory the scenario does not define.
    #[error("unknown territory: {0}")]
    UnknownTerritory(String),

    /// Two dynasties or two territories share a name.
    #[error("duplicate name in scenario: {0}")]
    DuplicateName(String),

    /// A step payload could not be rendered as JSON.
    #[error("failed to serialize step payload: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Result of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Zero-based position in the script.
    pub index: usize,
    /// The step's `op` tag.
    pub op: &'static str,
    /// The outcome, with its payload rendered as JSON.
    pub outcome: Outcome<serde_json::Value>,
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario title.
    pub name: String,
    /// Seed used for plot rolls.
    pub seed: u64,
    /// One report per step.
    pub steps: Vec<StepReport>,
    /// Every event delivered during the run, in order.
    pub events: Vec<DiplomaticEvent>,
}

impl ScenarioReport {
    /// Number of steps that did not succeed.
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.outcome.success).count()
    }
}

/// Drives a [`Diplomacy`] core from a [`Scenario`].
#[derive(Debug)]
pub struct ScenarioRunner {
    core: ScenarioCore,
    seed: u64,
    dynasties: BTreeMap<String, DynastyId>,
    territories: BTreeMap<String, TerritoryId>,
}

impl ScenarioRunner {
    /// Build a core for `scenario` and register its world.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::DuplicateName`] for clashing names and
    /// [`RunnerError::UnknownDynasty`] for a territory controlled by an
    /// undefined dynasty.
    pub fn new(config: &SimulationConfig, scenario: &Scenario) -> Result<Self, RunnerError> {
        let seed = scenario.seed.unwrap_or(config.scenario.seed);
        let core = Diplomacy::new(
            config.diplomacy.clone(),
            EventLog::new(),
            RngFortune::new(SmallRng::seed_from_u64(seed)),
        );
        let mut runner = Self {
            core,
            seed,
            dynasties: BTreeMap::new(),
            territories: BTreeMap::new(),
        };

        for spec in &scenario.dynasties {
            if runner.dynasties.contains_key(&spec.name) {
                return Err(RunnerError::DuplicateName(spec.name.clone()));
            }
            let mut dynasty = Dynasty::new(spec.name.clone());
            dynasty.honor = spec.honor;
            dynasty.prestige = spec.prestige;
            dynasty.infamy = spec.infamy;
            dynasty.wealth = spec.wealth;
            dynasty.current_year = spec.year;
            let id = runner.core.register_dynasty(dynasty);
            runner.dynasties.insert(spec.name.clone(), id);
        }

        for spec in &scenario.territories {
            if runner.territories.contains_key(&spec.name) {
                return Err(RunnerError::DuplicateName(spec.name.clone()));
            }
            let controller = spec
                .controller
                .as_deref()
                .map(|name| runner.dynasty_id(name))
                .transpose()?;
            let id = runner.core.register_territory(Territory {
                id: TerritoryId::new(),
                name: spec.name.clone(),
                controller,
            });
            runner.territories.insert(spec.name.clone(), id);
        }

        info!(
            scenario = %scenario.name,
            seed,
            dynasties = runner.dynasties.len(),
            territories = runner.territories.len(),
            "Scenario loaded"
        );
        Ok(runner)
    }

    /// Execute every step of `scenario` and collect the reports.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunnerError`] raised by a step.
    pub fn run(mut self, scenario: &Scenario) -> Result<ScenarioReport, RunnerError> {
        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (index, step) in scenario.steps.iter().enumerate() {
            let outcome = self.run_step(step)?;
            debug!(index, op = step.op(), success = outcome.success, "Step executed");
            steps.push(StepReport {
                index,
                op: step.op(),
                outcome,
            });
        }

        let report = ScenarioReport {
            name: scenario.name.clone(),
            seed: self.seed,
            steps,
            events: self.core.sink_mut().drain(),
        };
        info!(
            scenario = %report.name,
            steps = report.steps.len(),
            failures = report.failures(),
            events = report.events.len(),
            "Scenario finished"
        );
        Ok(report)
    }

    /// Execute one step.
    ///
    /// # Errors
    ///
    /// Returns a [`RunnerError`] if the step names something undefined.
    pub fn run_step(&mut self, step: &Step) -> Result<Outcome<serde_json::Value>, RunnerError> {
        match step {
            Step::Action {
                actor,
                target,
                kind,
                data,
            } => {
                let (actor, target) = (self.dynasty_id(actor)?, self.dynasty_id(target)?);
                render(self.core.perform_action_named(actor, target, kind, data))
            }
            Step::CreateTreaty {
                a,
                b,
                treaty_type,
                duration,
                clauses,
            } => {
                let (a, b) = (self.dynasty_id(a)?, self.dynasty_id(b)?);
                let terms = (!clauses.is_empty()).then(|| TreatyTerms::Clauses(clauses.clone()));
                render(self.core.create_treaty(a, b, *treaty_type, *duration, terms))
            }
            Step::BreakTreaty {
                breaker,
                other,
                treaty_type,
            } => {
                let (breaker, other) = (self.dynasty_id(breaker)?, self.dynasty_id(other)?);
                let treaty = self
                    .core
                    .active_treaties_between(breaker, other)
                    .into_iter()
                    .find(|t| t.treaty_type == *treaty_type)
                    .map(|t| t.id);
                match treaty {
                    Some(treaty_id) => render(self.core.break_treaty(treaty_id, breaker)),
                    None => Ok(Outcome {
                        success: false,
                        message: format!("no active {} to break", treaty_type.label()),
                        payload: None,
                    }),
                }
            }
            Step::DeclareWar {
                attacker,
                defender,
                war_goal,
                target,
            } => {
                let (attacker, defender) = (self.dynasty_id(attacker)?, self.dynasty_id(defender)?);
                let target = target.as_deref().map(|t| self.territory_id(t)).transpose()?;
                render(self.core.declare_war(attacker, defender, *war_goal, target))
            }
            Step::SetWarScore {
                attacker,
                defender,
                attacker_score,
                defender_score,
            } => match self.war_between(attacker, defender)? {
                Ok(war) => render(self.core.set_war_score(war, *attacker_score, *defender_score)),
                Err(missing) => Ok(missing),
            },
            Step::NegotiatePeace {
                attacker,
                defender,
                enforced_by_attacker,
                territory,
                gold,
                vassalize,
                release_vassal,
            } => {
                let terms = PeaceTerms {
                    territory: territory.as_deref().map(|t| self.territory_id(t)).transpose()?,
                    gold: *gold,
                    vassalize: *vassalize,
                    release_vassal: *release_vassal,
                };
                match self.war_between(attacker, defender)? {
                    Ok(war) => {
                        render(self.core.negotiate_peace(war, *enforced_by_attacker, &terms))
                    }
                    Err(missing) => Ok(missing),
                }
            }
            Step::ExpireTreaties { year } => render(self.core.expire_treaties(*year)),
            Step::CollectTribute => render(self.core.collect_tribute()),
            Step::AdvanceYear { year } => render(self.core.advance_calendar(*year)),
            Step::Status { a, b } => {
                let (a, b) = (self.dynasty_id(a)?, self.dynasty_id(b)?);
                render(Ok(self.core.status(a, b)))
            }
        }
    }

    /// Resolve a dynasty name.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::UnknownDynasty`] if the name is not defined.
    pub fn dynasty_id(&self, name: &str) -> Result<DynastyId, RunnerError> {
        self.dynasties
            .get(name)
            .copied()
            .ok_or_else(|| RunnerError::UnknownDynasty(name.to_owned()))
    }

    /// Resolve a territory name.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::UnknownTerritory`] if the name is not defined.
    pub fn territory_id(&self, name: &str) -> Result<TerritoryId, RunnerError> {
        self.territories
            .get(name)
            .copied()
            .ok_or_else(|| RunnerError::UnknownTerritory(name.to_owned()))
    }

    /// The underlying core.
    pub const fn core(&self) -> &ScenarioCore {
        &self.core
    }

    /// The active war between two named dynasties, or an unsuccessful
    /// outcome explaining that there is none.
    fn war_between(
        &self,
        attacker: &str,
        defender: &str,
    ) -> Result<Result<concord_types::WarId, Outcome<serde_json::Value>>, RunnerError> {
        let (a, b) = (self.dynasty_id(attacker)?, self.dynasty_id(defender)?);
        Ok(self
            .core
            .active_war_between(a, b)
            .map(|war: &War| war.id)
            .ok_or_else(|| Outcome {
                success: false,
                message: format!("no active war between {attacker} and {defender}"),
                payload: None,
            }))
    }
}

/// Flatten an engine result into a JSON-payload outcome.
fn render<T: Serialize>(
    result: Result<Outcome<T>, DiplomacyError>,
) -> Result<Outcome<serde_json::Value>, RunnerError> {
    let outcome = Outcome::from(result);
    let payload = outcome
        .payload
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;
    Ok(Outcome {
        success: outcome.success,
        message: outcome.message,
        payload,
    })
}
