//! The `(success, message, payload)` result shape handed to orchestrators.

use serde::Serialize;

use crate::error::DiplomacyError;

/// Result of a public diplomacy operation.
///
/// Operations return `Result<Outcome<T>, DiplomacyError>`. A rejection is an
/// `Err` and nothing was committed. An `Ok` outcome was committed; it can
/// still report `success = false` when the operation ran to completion but
/// did not achieve its aim (a discovered assassination plot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
    /// Whether the operation achieved its aim.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// The entity created or changed, if any.
    pub payload: Option<T>,
}

impl<T> Outcome<T> {
    /// A successful outcome carrying `payload`.
    pub fn success(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: Some(payload),
        }
    }

    /// A committed but unsuccessful outcome carrying `payload`.
    pub fn failure(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: Some(payload),
        }
    }

    /// Transform the payload, keeping the status and message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            success: self.success,
            message: self.message,
            payload: self.payload.map(f),
        }
    }
}

impl<T> From<Result<Outcome<T>, DiplomacyError>> for Outcome<T> {
    fn from(result: Result<Outcome<T>, DiplomacyError>) -> Self {
        result.unwrap_or_else(|err| Self {
            success: false,
            message: err.to_string(),
            payload: None,
        })
    }
}
