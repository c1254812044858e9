//! Outbound Ports (Driven Ports)
//!
//! The synchronous client the adapter wraps. Implementations are free to
//! block for as long as a command takes; the adapter guarantees that no two
//! methods are ever called concurrently on the same session.

use p4_types::{Record, SessionError, SpecFieldTable};

/// A synchronous, single-session command client.
///
/// The adapter takes ownership of the session at construction and only
/// touches it while holding its serialization gate, so implementations need
/// `Send` but not `Sync`.
pub trait BlockingSession: Send + 'static {
    /// Open the connection.
    fn connect(&mut self) -> Result<(), SessionError>;

    /// Close the connection.
    fn disconnect(&mut self) -> Result<(), SessionError>;

    /// Whether the connection is currently open.
    fn is_connected(&self) -> bool;

    /// Execute one command and return its records.
    fn run(&mut self, command: &str, args: &[String]) -> Result<Vec<Record>, SessionError>;

    /// Set the input buffer consumed by the next `-i` style command.
    fn set_input(&mut self, input: Vec<Record>);

    /// Listable command -> spec fields. Read once at adapter construction.
    fn spec_fields(&self) -> SpecFieldTable {
        SpecFieldTable::standard()
    }

    /// List the tickets known to the client.
    fn run_tickets(&mut self) -> Result<Vec<Record>, SessionError> {
        self.run("tickets", &[])
    }
}
