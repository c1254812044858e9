//! Service Layer
//!
//! - `serializer`: single-worker execution gate
//! - `protocol`: fetch-one, save-one, iterate-many
//! - `adapter`: `P4Async`, the async facade over a session
//! - `resolver`: operation-name dispatch
//! - `lifecycle`: scoped use with guaranteed disconnect

pub mod adapter;
pub mod lifecycle;
pub mod protocol;
pub mod resolver;
pub mod serializer;

pub use adapter::{Execution, P4Async};
pub use protocol::RecordStream;
pub use resolver::{OperationOutput, ResolvedOperation};
pub use serializer::{ExecutionSerializer, PendingOperation, SerializerStats};
