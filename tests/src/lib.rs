//! # p4-async Test Suite
//!
//! Cross-module tests run against `InMemorySession`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── serialization.rs  # exclusion, ordering, cancellation, panics
//!     ├── dispatch.rs       # operation names end to end
//!     ├── iteration.rs      # iterate-many streams
//!     └── lifecycle.rs      # scoped use and close
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p p4-tests
//! cargo test -p p4-tests integration::dispatch::
//!
//! # Benchmarks
//! cargo bench -p p4-tests
//! ```

pub mod integration;

use p4_async::{InMemorySession, P4Async};
use p4_telemetry::TelemetryConfig;
use std::sync::Once;

static LOGGING: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// Honors `P4ASYNC_LOG_LEVEL` / `RUST_LOG`; silent unless one is set.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let config = TelemetryConfig::from_env();
        let quiet = std::env::var("P4ASYNC_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err();
        let config = TelemetryConfig {
            console_output: !quiet,
            ..config
        };
        // Another harness may have installed a subscriber already
        let _ = p4_telemetry::init_logging(&config);
    });
}

/// Adapter over `session` with test logging installed.
pub fn adapter(session: InMemorySession) -> P4Async<InMemorySession> {
    init_test_logging();
    match P4Async::new(session) {
        Ok(adapter) => adapter,
        Err(e) => panic!("failed to start adapter: {e}"),
    }
}
