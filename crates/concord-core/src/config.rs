//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `concord-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use concord_diplomacy::{DiplomacyConfig, InvalidConfig};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but are inconsistent.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// The first inconsistency found.
        #[from]
        source: InvalidConfig,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `concord-config.yaml`. Every field has a
/// default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Diplomacy tunables.
    #[serde(default)]
    pub diplomacy: DiplomacyConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scenario run settings.
    #[serde(default)]
    pub scenario: ScenarioSettings,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CONCORD_SEED` overrides `scenario.seed`
    /// - `CONCORD_LOG` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("CONCORD_SEED").ok().as_deref(),
            std::env::var("CONCORD_LOG").ok(),
        );
    }

    /// Apply override values. A seed that does not parse is ignored.
    pub fn apply_overrides(&mut self, seed: Option<&str>, level: Option<String>) {
        if let Some(raw) = seed {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.scenario.seed = seed,
                Err(_) => warn!(value = raw, "Ignoring CONCORD_SEED: not an unsigned integer"),
            }
        }
        if let Some(level) = level {
            self.logging.level = level;
        }
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(self.diplomacy.validate()?)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Scenario run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScenarioSettings {
    /// Seed for plot rolls, unless the scenario file sets its own.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_seed() -> u64 {
    42
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config: Result<SimulationConfig, _> = serde_yml::from_str("{}");
        assert!(matches!(&config, Ok(c) if *c == SimulationConfig::default()));
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r"
diplomacy:
  war:
    peace_war_score_gate: 60
logging:
  json: true
scenario:
  seed: 7
";
        let config: SimulationConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.diplomacy.war.peace_war_score_gate, 60);
        assert_eq!(config.diplomacy.war.declaration_penalty, 40);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.scenario.seed, 7);
    }

    #[test]
    fn overrides_replace_seed_and_level() {
        let mut config = SimulationConfig::default();
        config.apply_overrides(Some("1066"), Some("debug".to_owned()));
        assert_eq!(config.scenario.seed, 1066);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn malformed_seed_override_is_ignored() {
        let mut config = SimulationConfig::default();
        config.apply_overrides(Some("many"), None);
        assert_eq!(config.scenario.seed, 42);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let yaml = r"
diplomacy:
  relations:
    min_score: 10
    max_score: -10
";
        let config: Result<SimulationConfig, _> = serde_yml::from_str(yaml);
        assert!(matches!(
            config.as_ref().map(SimulationConfig::validate),
            Ok(Err(ConfigError::Invalid {
                source: InvalidConfig::InvertedBounds { .. }
            }))
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../concord-config.yaml");
        let config = SimulationConfig::from_file(&path);
        assert!(config.is_ok(), "failed to load concord-config.yaml: {config:?}");
    }
}
