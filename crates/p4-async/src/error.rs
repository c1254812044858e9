//! Error types for the async adapter

use p4_types::SessionError;
use thiserror::Error;

/// Errors surfaced by adapter operations.
///
/// Failures of the blocking session are carried unchanged in
/// [`AdapterError::Command`]; the adapter never retries.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The operation name matches no synthesis rule.
    #[error("Unknown operation: {0}")]
    Resolution(String),

    /// A resolved operation was called with arguments it cannot use.
    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    /// Iteration requested for a command missing from the spec-field table.
    #[error("Unknown spec list command: {0}")]
    UnknownListableCommand(String),

    /// The blocking session call failed.
    #[error("Session call `{command}` failed: {source}")]
    Command {
        command: String,
        #[source]
        source: SessionError,
    },

    /// Zero records where one was expected.
    #[error("Command `{command}` returned no records")]
    EmptyResult { command: String },

    /// A summary record lacks the field that keys it.
    #[error("Record from `{command}` has no `{field}` field")]
    MissingKeyField { command: String, field: String },

    /// The worker thread could not be spawned.
    #[error("Failed to start session worker: {0}")]
    WorkerStart(String),

    /// The submitted call panicked on the worker.
    #[error("Session worker panicked: {0}")]
    WorkerPanicked(String),

    /// The worker has shut down; nothing will run.
    #[error("Session worker is not running")]
    WorkerUnavailable,
}

impl AdapterError {
    /// Wrap a session failure for `command`.
    pub fn command(command: impl Into<String>, source: SessionError) -> Self {
        Self::Command {
            command: command.into(),
            source,
        }
    }

    /// The underlying session failure, if this error carries one.
    #[must_use]
    pub fn session_error(&self) -> Option<&SessionError> {
        match self {
            Self::Command { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;
