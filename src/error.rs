//! Error types for the qlearn crate

use thiserror::Error;

use crate::types::StateId;

/// Main error type for the qlearn crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The environment detected a configuration that violates its own
    /// invariants. Training on it must stop until the environment is reset.
    #[error("{environment} reached an invalid state: {reason}")]
    InvalidState {
        environment: &'static str,
        reason: String,
    },

    #[error("{environment} rejected action {action}")]
    IllegalAction {
        environment: &'static str,
        action: String,
    },

    #[error("agent has no environment bound")]
    Unbound,

    #[error("non-terminal state {state} has no legal actions")]
    NoLegalActions { state: StateId },

    #[error("state {state} is terminal; reset the environment before asking for an action")]
    EpisodeFinished { state: StateId },

    #[error("invalid level: {reason}")]
    InvalidLevel { reason: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Whether the error originates from an environment invariant violation.
    ///
    /// Drivers use this to decide between resetting the environment and
    /// aborting the run.
    pub fn is_environment_fault(&self) -> bool {
        matches!(
            self,
            Error::InvalidState { .. } | Error::IllegalAction { .. } | Error::NoLegalActions { .. }
        )
    }
}
