//! Configuration and scenario orchestration for the Concord diplomacy core.
//!
//! This crate sits between `concord-diplomacy` (the state machine) and the
//! `concord-engine` binary. It loads `concord-config.yaml`, parses scenario
//! files, and drives a [`Diplomacy`](concord_diplomacy::Diplomacy) core
//! through their steps.
//!
//! # Modules
//!
//! - [`config`] -- Typed configuration and the YAML loader ([`SimulationConfig`])
//! - [`runner`] -- The [`ScenarioRunner`] and its reports
//! - [`scenario`] -- The scenario file model ([`Scenario`], [`Step`])

pub mod config;
pub mod runner;
pub mod scenario;

pub use config::{ConfigError, LoggingConfig, ScenarioSettings, SimulationConfig};
pub use runner::{RunnerError, ScenarioCore, ScenarioReport, ScenarioRunner, StepReport};
pub use scenario::{DynastySpec, Scenario, Step, TerritorySpec};
