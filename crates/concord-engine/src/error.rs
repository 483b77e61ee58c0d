//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode of a run, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration or scenario loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: concord_core::ConfigError,
    },

    /// The scenario run was aborted.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: concord_core::RunnerError,
    },

    /// Writing the event log failed.
    #[error("output error: {source}")]
    Output {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An event could not be rendered as JSON.
    #[error("serialization error: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
