//! Domain Layer
//!
//! Pure logic, no I/O: operation-name classification and run-wrap command
//! forms.

pub mod forms;
pub mod operation;

pub use forms::{CommandForm, OperationArgs, PreparedCommand};
pub use operation::{
    OperationName, RunWrapMethod, SimpleMethod, RUN_WRAP_METHODS, SIMPLE_WRAP_METHODS,
};
