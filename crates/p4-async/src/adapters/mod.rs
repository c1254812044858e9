//! Adapters Layer
//!
//! - `memory`: scriptable in-memory `BlockingSession` with a call journal

pub mod memory;

pub use memory::{CallRecord, InMemorySession, SessionJournal};
