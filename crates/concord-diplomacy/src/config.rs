//! Tunable constants for the diplomacy state machine.
//!
//! These values correspond to the `diplomacy` key of `concord-config.yaml`.
//! The [`DiplomacyConfig`] struct bundles every scalar tunable so that
//! callers (scenario runner, tests) can override defaults. The per-kind
//! tables (treaty gates, signing bonuses, action magnitudes) are exhaustive
//! matches on the type enums and are not configurable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for the diplomacy engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyConfig {
    /// Relation score bounds.
    #[serde(default)]
    pub relations: RelationConfig,

    /// Treaty breaking and vassalage parameters.
    #[serde(default)]
    pub treaties: TreatyConfig,

    /// War declaration and peace parameters.
    #[serde(default)]
    pub war: WarConfig,

    /// Side effects of ordinary actions.
    #[serde(default)]
    pub actions: ActionConfig,

    /// Assassination plot parameters.
    #[serde(default)]
    pub assassination: AssassinationConfig,
}

impl DiplomacyConfig {
    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidConfig`] problem found.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        let RelationConfig {
            min_score,
            max_score,
        } = self.relations;
        if min_score > max_score {
            return Err(InvalidConfig::InvertedBounds {
                min_score,
                max_score,
            });
        }
        if min_score > 0 || max_score < 0 {
            return Err(InvalidConfig::NeutralOutOfBounds);
        }
        let rate = self.treaties.vassal_tribute_rate;
        if rate.is_sign_negative() || rate > Decimal::ONE {
            return Err(InvalidConfig::TributeRate(rate));
        }
        let chance = self.assassination.success_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(InvalidConfig::SuccessChance(chance));
        }
        Ok(())
    }
}

/// A diplomacy configuration whose values are inconsistent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidConfig {
    /// The lower relation bound exceeds the upper one.
    #[error("relations.min_score ({min_score}) exceeds relations.max_score ({max_score})")]
    InvertedBounds {
        /// Configured lower bound.
        min_score: i64,
        /// Configured upper bound.
        max_score: i64,
    },

    /// The relation bounds exclude the neutral score 0.
    #[error("relation bounds must include the neutral score 0")]
    NeutralOutOfBounds,

    /// The vassal tribute rate lies outside [0, 1].
    #[error("treaties.vassal_tribute_rate must be within [0, 1], got {0}")]
    TributeRate(Decimal),

    /// The assassination success chance lies outside [0, 1].
    #[error("assassination.success_chance must be within [0, 1], got {0}")]
    SuccessChance(f64),
}

/// Relation score bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationConfig {
    /// Lowest reachable relation score.
    #[serde(default = "default_min_score")]
    pub min_score: i64,

    /// Highest reachable relation score.
    #[serde(default = "default_max_score")]
    pub max_score: i64,
}

impl RelationConfig {
    /// Clamp a score into the configured range.
    pub fn clamp(&self, score: i64) -> i64 {
        score.clamp(self.min_score, self.max_score.max(self.min_score))
    }
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_score: default_max_score(),
        }
    }
}

/// Treaty breaking and vassalage parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatyConfig {
    /// Relation penalty for breaking a treaty (default: 20).
    #[serde(default = "default_break_penalty")]
    pub break_penalty: i64,

    /// Honor lost by the breaker (default: 10).
    #[serde(default = "default_break_honor_loss")]
    pub break_honor_loss: i64,

    /// Tribute rate written into vassalage imposed at the peace table (default: 0.10).
    #[serde(default = "default_vassal_tribute_rate")]
    pub vassal_tribute_rate: Decimal,
}

impl Default for TreatyConfig {
    fn default() -> Self {
        Self {
            break_penalty: default_break_penalty(),
            break_honor_loss: default_break_honor_loss(),
            vassal_tribute_rate: default_vassal_tribute_rate(),
        }
    }
}

/// War declaration and peace parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarConfig {
    /// Relation penalty for declaring war (default: 40).
    #[serde(default = "default_declaration_penalty")]
    pub declaration_penalty: i64,

    /// Infamy gained by the attacker (default: 10).
    #[serde(default = "default_declaration_infamy")]
    pub declaration_infamy: i64,

    /// Relation bonus when peace is signed (default: 10).
    #[serde(default = "default_peace_bonus")]
    pub peace_bonus: i64,

    /// War score the enforcing side needs to impose terms (default: 50).
    #[serde(default = "default_peace_war_score_gate")]
    pub peace_war_score_gate: i64,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            declaration_penalty: default_declaration_penalty(),
            declaration_infamy: default_declaration_infamy(),
            peace_bonus: default_peace_bonus(),
            peace_war_score_gate: default_peace_war_score_gate(),
        }
    }
}

/// Side effects of ordinary actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Infamy gained by declaring a rivalry (default: 5).
    #[serde(default = "default_rivalry_infamy")]
    pub rivalry_infamy: i64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            rivalry_infamy: default_rivalry_infamy(),
        }
    }
}

/// Assassination plot parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssassinationConfig {
    /// Base probability that a plot succeeds (default: 0.30).
    #[serde(default = "default_success_chance")]
    pub success_chance: f64,

    /// Infamy gained when a plot is discovered (default: 20).
    #[serde(default = "default_failure_infamy")]
    pub failure_infamy: i64,

    /// Honor lost when a plot is discovered (default: 10).
    #[serde(default = "default_failure_honor_loss")]
    pub failure_honor_loss: i64,

    /// Extra relation penalty when a plot is discovered (default: 50).
    #[serde(default = "default_failure_relation_penalty")]
    pub failure_relation_penalty: i64,

    /// Infamy gained by a successful plot (default: 10).
    #[serde(default = "default_success_infamy")]
    pub success_infamy: i64,

    /// Honor lost by a successful plot (default: 5).
    #[serde(default = "default_success_honor_loss")]
    pub success_honor_loss: i64,
}

impl Default for AssassinationConfig {
    fn default() -> Self {
        Self {
            success_chance: default_success_chance(),
            failure_infamy: default_failure_infamy(),
            failure_honor_loss: default_failure_honor_loss(),
            failure_relation_penalty: default_failure_relation_penalty(),
            success_infamy: default_success_infamy(),
            success_honor_loss: default_success_honor_loss(),
        }
    }
}

const fn default_min_score() -> i64 {
    -100
}

const fn default_max_score() -> i64 {
    100
}

const fn default_break_penalty() -> i64 {
    20
}

const fn default_break_honor_loss() -> i64 {
    10
}

const fn default_vassal_tribute_rate() -> Decimal {
    Decimal::from_parts(10, 0, 0, false, 2)
}

const fn default_declaration_penalty() -> i64 {
    40
}

const fn default_declaration_infamy() -> i64 {
    10
}

const fn default_peace_bonus() -> i64 {
    10
}

const fn default_peace_war_score_gate() -> i64 {
    50
}

const fn default_rivalry_infamy() -> i64 {
    5
}

const fn default_success_chance() -> f64 {
    0.30
}

const fn default_failure_infamy() -> i64 {
    20
}

const fn default_failure_honor_loss() -> i64 {
    10
}

const fn default_failure_relation_penalty() -> i64 {
    50
}

const fn default_success_infamy() -> i64 {
    10
}

const fn default_success_honor_loss() -> i64 {
    5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DiplomacyConfig::default().validate().is_ok());
    }

    #[test]
    fn default_tribute_rate_is_ten_percent() {
        assert_eq!(
            DiplomacyConfig::default().treaties.vassal_tribute_rate,
            Decimal::new(10, 2)
        );
    }

    #[test]
    fn clamp_respects_bounds() {
        let bounds = RelationConfig::default();
        assert_eq!(bounds.clamp(150), 100);
        assert_eq!(bounds.clamp(-150), -100);
        assert_eq!(bounds.clamp(42), 42);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut config = DiplomacyConfig::default();
        config.relations.min_score = 10;
        config.relations.max_score = -10;
        assert_eq!(
            config.validate(),
            Err(InvalidConfig::InvertedBounds {
                min_score: 10,
                max_score: -10,
            })
        );

        config.relations.max_score = 20;
        assert_eq!(config.validate(), Err(InvalidConfig::NeutralOutOfBounds));
    }

    #[test]
    fn tribute_rate_above_one_is_rejected() {
        let mut config = DiplomacyConfig::default();
        config.treaties.vassal_tribute_rate = Decimal::new(15, 1);
        assert_eq!(
            config.validate(),
            Err(InvalidConfig::TributeRate(Decimal::new(15, 1)))
        );
    }

    #[test]
    fn out_of_range_chance_is_rejected() {
        let mut config = DiplomacyConfig::default();
        config.assassination.success_chance = 1.5;
        assert!(matches!(config.validate(), Err(InvalidConfig::SuccessChance(_))));
        config.assassination.success_chance = f64::NAN;
        assert!(matches!(config.validate(), Err(InvalidConfig::SuccessChance(_))));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "war:\n  peace_bonus: 25\n";
        let c: DiplomacyConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(c.war.peace_bonus, 25);
        assert_eq!(c.war.declaration_penalty, 40);
        assert_eq!(c.treaties.break_penalty, 20);
    }
}
