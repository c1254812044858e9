//! Command forms
//!
//! Argument shaping and result post-processing for the run-wrap methods.
//! Both the inline and the asynchronous execution path go through the same
//! form, so the shaping exists exactly once.

use p4_types::Record;

use crate::domain::operation::RunWrapMethod;
use crate::error::{AdapterError, Result};

/// Arguments for a resolved operation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationArgs {
    /// Positional command arguments.
    pub args: Vec<String>,
    /// Record for the session input buffer (save-one, submit, login).
    pub input: Option<Record>,
}

impl OperationArgs {
    pub fn new<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            input: None,
        }
    }

    /// Attach an input record.
    #[must_use]
    pub fn with_input(mut self, input: Record) -> Self {
        self.input = Some(input);
        self
    }
}

/// A command ready to hand to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    pub command: String,
    pub args: Vec<String>,
    /// Set as the session input buffer right before the run.
    pub input: Option<Vec<Record>>,
}

/// Shaping rules of one run-wrap method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandForm {
    method: RunWrapMethod,
}

impl CommandForm {
    #[must_use]
    pub const fn new(method: RunWrapMethod) -> Self {
        Self { method }
    }

    #[must_use]
    pub const fn method(&self) -> RunWrapMethod {
        self.method
    }

    /// Shape caller arguments into the command the session runs.
    pub fn prepare(&self, call: OperationArgs) -> Result<PreparedCommand> {
        let command = self.method.command().to_string();
        let OperationArgs { args, input } = call;

        let (args, input) = match self.method {
            RunWrapMethod::Submit | RunWrapMethod::Shelve => match input {
                Some(spec) => (prepend("-i", args), Some(vec![spec])),
                None => (args, None),
            },
            RunWrapMethod::DeleteShelve => {
                self.reject_input(input.as_ref())?;
                let args = match args.as_slice() {
                    [change] if !change.starts_with('-') => {
                        vec!["-d".to_string(), "-c".to_string(), change.clone()]
                    }
                    _ => prepend("-d", args),
                };
                (args, None)
            }
            RunWrapMethod::Login => (args, input.map(|password| vec![password])),
            RunWrapMethod::Password => {
                self.reject_input(input.as_ref())?;
                let [old, new] = <[String; 2]>::try_from(args).map_err(|args| {
                    self.invalid(format!("expected old and new password, got {} args", args.len()))
                })?;
                let mut answers = Vec::with_capacity(3);
                if !old.is_empty() {
                    answers.push(Record::Text(old));
                }
                answers.push(Record::Text(new.clone()));
                answers.push(Record::Text(new));
                (Vec::new(), Some(answers))
            }
            RunWrapMethod::Filelog | RunWrapMethod::Print | RunWrapMethod::Resolve => {
                self.reject_input(input.as_ref())?;
                (args, None)
            }
        };

        Ok(PreparedCommand {
            command,
            args,
            input,
        })
    }

    /// Post-process the records the session returned.
    #[must_use]
    pub fn finish(&self, records: Vec<Record>) -> Vec<Record> {
        match self.method {
            RunWrapMethod::Filelog => records.into_iter().filter(Record::is_structured).collect(),
            RunWrapMethod::Print => merge_content_chunks(records),
            _ => records,
        }
    }

    fn reject_input(&self, input: Option<&Record>) -> Result<()> {
        match input {
            Some(_) => Err(self.invalid("does not take an input record".to_string())),
            None => Ok(()),
        }
    }

    fn invalid(&self, reason: String) -> AdapterError {
        AdapterError::InvalidArguments {
            operation: self.method.name().to_string(),
            reason,
        }
    }
}

fn prepend(flag: &str, args: Vec<String>) -> Vec<String> {
    std::iter::once(flag.to_string()).chain(args).collect()
}

/// `print` streams a file's content as several chunks after its header
/// record; join consecutive chunks of the same kind into one record.
fn merge_content_chunks(records: Vec<Record>) -> Vec<Record> {
    let mut merged: Vec<Record> = Vec::with_capacity(records.len());
    for record in records {
        let joined = match (merged.last_mut(), &record) {
            (Some(Record::Text(acc)), Record::Text(chunk)) => {
                acc.push_str(chunk);
                true
            }
            (Some(Record::Binary(acc)), Record::Binary(chunk)) => {
                acc.extend_from_slice(chunk);
                true
            }
            _ => false,
        };
        if !joined {
            merged.push(record);
        }
    }
    merged
}
