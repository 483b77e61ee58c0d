//! Relations, treaties, war and peace between dynasties.
//!
//! This crate is the diplomacy state machine of the Concord workspace. It
//! operates on in-memory state only; persistence and turn scheduling belong
//! to the orchestrator that drives it.
//!
//! # Modules
//!
//! - [`actions`] -- Discrete diplomatic actions and assassination plots
//! - [`config`] -- Tunable penalties, bonuses and gates ([`DiplomacyConfig`])
//! - [`engine`] -- The [`Diplomacy`] facade and its thread-safe wrapper
//! - [`error`] -- Error types for every operation ([`DiplomacyError`])
//! - [`events`] -- Event delivery ([`EventSink`], [`EventLog`])
//! - [`fortune`] -- Injectable randomness ([`Fortune`])
//! - [`outcome`] -- The `(success, message, payload)` result shape
//! - [`peace`] -- Peace settlements and tribute
//! - [`relations`] -- Canonical relation records ([`RelationStore`])
//! - [`state`] -- Committed state ([`DiplomacyState`])
//! - [`transaction`] -- Copy-on-write transactions with savepoints
//! - [`treaties`] -- Signing, breaking and expiring treaties
//! - [`war`] -- War declarations and war score
//!
//! # Example
//!
//! ```
//! use concord_diplomacy::{Diplomacy, DiplomacyConfig, EventLog, FixedFortune};
//! use concord_types::{ActionKind, Dynasty, RelationStatus};
//!
//! let mut core = Diplomacy::new(
//!     DiplomacyConfig::default(),
//!     EventLog::new(),
//!     FixedFortune::NEVER,
//! );
//! let habsburg = core.register_dynasty(Dynasty::new("Habsburg"));
//! let valois = core.register_dynasty(Dynasty::new("Valois"));
//!
//! let envoy = ActionKind::SendEnvoy;
//! let outcome = core.perform_action(habsburg, valois, envoy, &serde_json::Value::Null);
//! assert!(outcome.is_ok_and(|o| o.success));
//!
//! let reading = core.status(habsburg, valois).payload;
//! assert_eq!(reading.map(|r| r.status), Some(RelationStatus::Neutral));
//! ```

pub mod actions;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fortune;
pub mod outcome;
pub mod peace;
pub mod relations;
pub mod state;
pub mod transaction;
pub mod treaties;
pub mod war;

// Re-export primary types at crate root for convenience.
pub use actions::{ActionReport, PlotOutcome, action_magnitude};
pub use config::{
    ActionConfig, AssassinationConfig, DiplomacyConfig, InvalidConfig, RelationConfig,
    TreatyConfig, WarConfig,
};
pub use engine::{Diplomacy, RelationReading, SharedDiplomacy};
pub use error::DiplomacyError;
pub use events::{EventLog, EventSink, Notice};
pub use fortune::{FixedFortune, Fortune, RngFortune, assassination_odds};
pub use outcome::Outcome;
pub use peace::{PeaceSettlement, TermOutcome};
pub use relations::{RelationChange, RelationRecord, RelationStore};
pub use state::DiplomacyState;
pub use transaction::Transaction;
