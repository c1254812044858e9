//! Adapter configuration
//!
//! All fields have defaults and can be overridden from the environment.

use std::env;

/// Default name of the session worker thread.
pub const DEFAULT_WORKER_NAME: &str = "p4async-worker";

/// Default queue depth above which a backlog warning is logged.
pub const DEFAULT_BACKLOG_WARN_THRESHOLD: usize = 64;

/// Configuration for one adapter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Name given to the dedicated worker thread.
    pub worker_name: String,

    /// Queue depth that triggers a backlog warning. Submissions are never
    /// rejected; this only affects logging.
    pub backlog_warn_threshold: usize,

    /// Emit a debug event for every submitted session call.
    pub log_commands: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            backlog_warn_threshold: DEFAULT_BACKLOG_WARN_THRESHOLD,
            log_commands: true,
        }
    }
}

impl AdapterConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `P4ASYNC_WORKER_NAME`: worker thread name (default: p4async-worker)
    /// - `P4ASYNC_BACKLOG_WARN`: backlog warning threshold (default: 64)
    /// - `P4ASYNC_LOG_COMMANDS`: per-call debug events (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            worker_name: env::var("P4ASYNC_WORKER_NAME").unwrap_or(defaults.worker_name),

            backlog_warn_threshold: env::var("P4ASYNC_BACKLOG_WARN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backlog_warn_threshold),

            log_commands: env::var("P4ASYNC_LOG_COMMANDS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.log_commands),
        }
    }

    /// Override the worker thread name.
    #[must_use]
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Override the backlog warning threshold.
    #[must_use]
    pub fn backlog_warn_threshold(mut self, threshold: usize) -> Self {
        self.backlog_warn_threshold = threshold;
        self
    }
}
