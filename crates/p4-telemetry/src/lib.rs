//! # p4 Telemetry
//!
//! Logging bootstrap for processes embedding the async adapter.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use p4_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).expect("Failed to init logging");
//!     // Adapter events are now written to stdout
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `p4async` | Service name on the startup event |
//! | `P4ASYNC_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directives |
//! | `P4ASYNC_JSON_LOGS` | `false` | JSON lines instead of plain text |
//! | `P4ASYNC_CONSOLE_OUTPUT` | `true` | Write events to stdout at all |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Logging bootstrap errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter `{directives}`: {reason}")]
    Filter { directives: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}
