//! Integration flows, one module per concern.

pub mod iteration;
pub mod lifecycle;
pub mod serialization;
