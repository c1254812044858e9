//! # p4-async
//!
//! Non-blocking adapter over a synchronous, single-session version-control
//! client.
//!
//! ## Purpose
//!
//! The wrapped client can run one command at a time and blocks for the
//! duration of each command. `P4Async` lets any number of async tasks share
//! it: calls are queued to a dedicated worker thread and awaited, so callers
//! never block a runtime thread and the session never sees two calls at once.
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | Session calls never overlap | `service/serializer.rs` - gate mutex |
//! | Queued calls run in call order | `service/serializer.rs` - single worker FIFO |
//! | Failures reach the caller unchanged | `error.rs` - `AdapterError::Command` |
//! | A panicking call does not wedge the session | `service/serializer.rs` - `catch_unwind` |
//! | Scoped use ends disconnected | `service/lifecycle.rs` - `scope` |
//!
//! ## Operation Names
//!
//! Operations can be called directly (`afetch`, `asave`, ...) or resolved
//! from a name:
//!
//! ```rust,ignore
//! let client = adapter
//!     .resolve("afetch_client")?
//!     .call(OperationArgs::new(["ws1"]))
//!     .await?
//!     .into_record();
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/memory.rs  - InMemorySession (scripted, journaled)    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - AsyncCommandApi                            │
//! │  ports/outbound.rs - BlockingSession                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service/  - serializer, protocol helpers, adapter, resolver,   │
//! │              lifecycle                                          │
//! │  domain/   - OperationName, CommandForm                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{CallRecord, InMemorySession, SessionJournal};
pub use config::AdapterConfig;
pub use domain::{OperationArgs, OperationName, RunWrapMethod, SimpleMethod};
pub use error::{AdapterError, Result};
pub use ports::{AsyncCommandApi, BlockingSession};
pub use service::{
    Execution, ExecutionSerializer, OperationOutput, P4Async, PendingOperation, RecordStream,
    ResolvedOperation, SerializerStats,
};

pub use p4_types::{Record, SessionError, SpecFieldTable, SpecFields};
