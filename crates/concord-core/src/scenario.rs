//! Scripted scenarios.
//!
//! A scenario file names the dynasties and territories of a small world and
//! lists the diplomatic steps to play out. Dynasties and territories are
//! addressed by name; the runner resolves names to ids.
//!
//! ```yaml
//! name: Hundred Years
//! dynasties:
//!   - name: Plantagenet
//!     wealth: 400
//!   - name: Valois
//! territories:
//!   - name: Gascony
//!     controller: Plantagenet
//! steps:
//!   - op: action
//!     actor: Valois
//!     target: Plantagenet
//!     kind: insult
//!   - op: declare_war
//!     attacker: Valois
//!     defender: Plantagenet
//!     war_goal: conquest
//!     target: Gascony
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use concord_types::{TreatyType, WarGoal};

use crate::config::ConfigError;

/// A scripted run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    /// Human-readable title.
    #[serde(default = "default_name")]
    pub name: String,

    /// Seed for plot rolls; falls back to the configured seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Dynasties to register.
    #[serde(default)]
    pub dynasties: Vec<DynastySpec>,

    /// Territories to register.
    #[serde(default)]
    pub territories: Vec<TerritorySpec>,

    /// Steps to execute, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content does not describe a scenario.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string does not describe a scenario.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// A dynasty to register.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DynastySpec {
    /// Unique name, used to address the dynasty in steps.
    pub name: String,
    /// Starting honor.
    #[serde(default = "default_reputation")]
    pub honor: i64,
    /// Starting prestige.
    #[serde(default = "default_reputation")]
    pub prestige: i64,
    /// Starting infamy.
    #[serde(default)]
    pub infamy: i64,
    /// Starting treasury.
    #[serde(default)]
    pub wealth: Decimal,
    /// Starting calendar year.
    #[serde(default = "default_year")]
    pub year: u32,
}

/// A territory to register.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerritorySpec {
    /// Unique name, used to address the territory in steps.
    pub name: String,
    /// Name of the controlling dynasty, if any.
    #[serde(default)]
    pub controller: Option<String>,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Perform a diplomatic action.
    Action {
        /// Acting dynasty.
        actor: String,
        /// Target dynasty.
        target: String,
        /// Action label (`send_envoy`, `insult`, ...).
        kind: String,
        /// Opaque payload passed to the event details.
        #[serde(default)]
        data: serde_json::Value,
    },
    /// Sign a treaty.
    CreateTreaty {
        /// First party.
        a: String,
        /// Second party.
        b: String,
        /// Treaty type.
        treaty_type: TreatyType,
        /// Term in years; permanent when absent.
        #[serde(default)]
        duration: Option<u32>,
        /// Free-form clauses.
        #[serde(default)]
        clauses: BTreeMap<String, String>,
    },
    /// Break the active treaty of a type between two dynasties.
    BreakTreaty {
        /// Dynasty breaking the treaty.
        breaker: String,
        /// The other party.
        other: String,
        /// Treaty type.
        treaty_type: TreatyType,
    },
    /// Declare war.
    DeclareWar {
        /// Aggressor.
        attacker: String,
        /// Defender.
        defender: String,
        /// War goal.
        war_goal: WarGoal,
        /// Conquest target, by name.
        #[serde(default)]
        target: Option<String>,
    },
    /// Report war scores for the active war between two dynasties.
    SetWarScore {
        /// Aggressor of the war.
        attacker: String,
        /// Defender of the war.
        defender: String,
        /// Attacker's war score.
        attacker_score: i64,
        /// Defender's war score.
        defender_score: i64,
    },
    /// Settle the active war between two dynasties.
    NegotiatePeace {
        /// Aggressor of the war.
        attacker: String,
        /// Defender of the war.
        defender: String,
        /// Whether the attacker dictates the terms.
        enforced_by_attacker: bool,
        /// Territory to cede, by name.
        #[serde(default)]
        territory: Option<String>,
        /// Reparations demanded.
        #[serde(default)]
        gold: Option<Decimal>,
        /// Impose vassalage.
        #[serde(default)]
        vassalize: bool,
        /// Demand release of a vassal.
        #[serde(default)]
        release_vassal: bool,
    },
    /// Expire treaties whose term has run out.
    ExpireTreaties {
        /// Reference year.
        year: u32,
    },
    /// Collect tribute from every vassal.
    CollectTribute,
    /// Move every dynasty's calendar to `year`.
    AdvanceYear {
        /// New year.
        year: u32,
    },
    /// Read the relation between two dynasties.
    Status {
        /// First dynasty.
        a: String,
        /// Second dynasty.
        b: String,
    },
}

impl Step {
    /// The `op` tag of this step.
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Action { .. } => "action",
            Self::CreateTreaty { .. } => "create_treaty",
            Self::BreakTreaty { .. } => "break_treaty",
            Self::DeclareWar { .. } => "declare_war",
            Self::SetWarScore { .. } => "set_war_score",
            Self::NegotiatePeace { .. } => "negotiate_peace",
            Self::ExpireTreaties { .. } => "expire_treaties",
            Self::CollectTribute => "collect_tribute",
            Self::AdvanceYear { .. } => "advance_year",
            Self::Status { .. } => "status",
        }
    }
}

fn default_name() -> String {
    "untitled".to_owned()
}

const fn default_reputation() -> i64 {
    50
}

const fn default_year() -> u32 {
    1
}
