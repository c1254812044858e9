//! Ports Layer
//!
//! - Driving Port (inbound): `AsyncCommandApi`, what async callers use
//! - Driven Port (outbound): `BlockingSession`, the synchronous client

pub mod inbound;
pub mod outbound;

pub use inbound::AsyncCommandApi;
pub use outbound::BlockingSession;
