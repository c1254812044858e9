//! # Error Types
//!
//! Failures raised by the blocking session itself.

use thiserror::Error;

/// Errors raised by a blocking session call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A command was issued while the session is disconnected.
    #[error("Not connected")]
    NotConnected,

    /// Establishing or tearing down the connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected or failed a command.
    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },
}

impl SessionError {
    /// Build a command failure.
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }
}
