//! Inbound Ports (Driving Ports)
//!
//! The object-safe async surface callers can hold as
//! `Arc<dyn AsyncCommandApi>` without naming the session type.

use async_trait::async_trait;
use p4_types::Record;

use crate::error::Result;
use crate::service::RecordStream;

/// Async command API (Driving Port)
#[async_trait]
pub trait AsyncCommandApi: Send + Sync {
    /// Run `command args...` on the session.
    async fn arun(&self, command: &str, args: &[&str]) -> Result<Vec<Record>>;

    /// Open the session connection.
    async fn aconnect(&self) -> Result<()>;

    /// Close the session connection.
    async fn adisconnect(&self) -> Result<()>;

    /// Whether the session reports itself connected.
    async fn ais_connected(&self) -> Result<bool>;

    /// Fetch one spec record via `command -o args...`.
    async fn afetch(&self, command: &str, args: &[&str]) -> Result<Record>;

    /// Submit `input` via `command -i args...`.
    async fn asave(&self, command: &str, input: Record, args: &[&str]) -> Result<Vec<Record>>;

    /// Run `command -d args...`.
    async fn adelete(&self, command: &str, args: &[&str]) -> Result<Vec<Record>>;

    /// Lazily fetch every record a listable command enumerates.
    ///
    /// Fails before anything is submitted if `command` is not listable.
    fn aiterate(&self, command: &str, args: &[&str]) -> Result<RecordStream>;
}
