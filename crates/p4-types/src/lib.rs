//! # Shared Types Crate
//!
//! Value types shared by the blocking session port and the async adapter.
//!
//! ## Design Principles
//!
//! - **Opaque records**: `Record` carries command output without interpreting
//!   it. The adapter only asks whether a record is structured and reads a
//!   single named field.
//! - **Static spec knowledge**: `SpecFieldTable` is built once by the client
//!   and never mutated by the adapter.

pub mod errors;
pub mod record;
pub mod spec_fields;

pub use errors::SessionError;
pub use record::Record;
pub use spec_fields::{SpecFieldTable, SpecFields};
