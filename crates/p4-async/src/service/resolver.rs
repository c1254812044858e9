//! # Dispatch Resolver
//!
//! Maps an operation name to an async operation on the adapter.
//!
//! | Name | Operation |
//! |------|-----------|
//! | `arun` | run the command given as first argument |
//! | `aconnect`, `adisconnect`, `arun_tickets` | blocking method, queued |
//! | `arun_submit`, `adelete_shelve`, ... | run-wrap method, queued |
//! | `arun_<cmd>` | run `cmd` |
//! | `adelete_<cmd>` | run `cmd -d` |
//! | `afetch_<cmd>` | fetch one record |
//! | `asave_<cmd>` | save one record |
//! | `aiterate_<cmd>` | stream every listed record |
//!
//! Anything else is [`AdapterError::Resolution`].

use p4_types::Record;
use tracing::debug;

use crate::domain::{OperationArgs, OperationName, SimpleMethod};
use crate::error::{AdapterError, Result};
use crate::ports::BlockingSession;
use crate::service::adapter::P4Async;
use crate::service::protocol::{self, RecordStream};

/// Value produced by a resolved operation.
#[derive(Debug)]
pub enum OperationOutput {
    Records(Vec<Record>),
    Record(Record),
    Stream(RecordStream),
    Done,
}

impl OperationOutput {
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Self::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_stream(self) -> Option<RecordStream> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// An operation name bound to an adapter.
pub struct ResolvedOperation<'a, S> {
    adapter: &'a P4Async<S>,
    name: OperationName,
}

impl<S: BlockingSession> P4Async<S> {
    /// Resolve `name` to an operation on this adapter.
    pub fn resolve(&self, name: &str) -> Result<ResolvedOperation<'_, S>> {
        let name = OperationName::parse(name)
            .ok_or_else(|| AdapterError::Resolution(name.to_string()))?;
        debug!(instance_id = %self.instance_id(), operation = %name, "Operation resolved");
        Ok(ResolvedOperation {
            adapter: self,
            name,
        })
    }
}

impl<S: BlockingSession> ResolvedOperation<'_, S> {
    #[must_use]
    pub fn name(&self) -> &OperationName {
        &self.name
    }

    /// Invoke the operation. Nothing is queued until the returned future is
    /// first polled.
    pub async fn call(&self, call: OperationArgs) -> Result<OperationOutput> {
        let adapter = self.adapter;
        let serializer = &adapter.serializer;

        match &self.name {
            OperationName::Explicit => {
                self.reject_input(&call)?;
                let Some((command, rest)) = call.args.split_first() else {
                    return Err(self.invalid("expected the command as first argument"));
                };
                protocol::run(serializer, command, rest.to_vec())
                    .await
                    .map(OperationOutput::Records)
            }
            OperationName::Run { command } => {
                self.reject_input(&call)?;
                protocol::run(serializer, command, call.args)
                    .await
                    .map(OperationOutput::Records)
            }
            OperationName::Delete { command } => {
                self.reject_input(&call)?;
                let args = std::iter::once("-d".to_string()).chain(call.args).collect();
                protocol::run(serializer, command, args)
                    .await
                    .map(OperationOutput::Records)
            }
            OperationName::Fetch { command } => {
                self.reject_input(&call)?;
                protocol::fetch_one(serializer, command, call.args)
                    .await
                    .map(OperationOutput::Record)
            }
            OperationName::Save { command } => {
                let OperationArgs { args, input } = call;
                let input = input.ok_or_else(|| self.invalid("expected a record to save"))?;
                protocol::save_one(serializer, command, input, args)
                    .await
                    .map(OperationOutput::Records)
            }
            OperationName::Iterate { command } => {
                self.reject_input(&call)?;
                protocol::iterate_many(serializer, adapter.spec_fields(), command, call.args)
                    .map(OperationOutput::Stream)
            }
            OperationName::Simple(method) => {
                self.reject_input(&call)?;
                if !call.args.is_empty() {
                    return Err(self.invalid("takes no arguments"));
                }
                match method {
                    SimpleMethod::Connect => adapter.aconnect().await.map(|()| OperationOutput::Done),
                    SimpleMethod::Disconnect => {
                        adapter.adisconnect().await.map(|()| OperationOutput::Done)
                    }
                    SimpleMethod::RunTickets => {
                        adapter.arun_tickets().await.map(OperationOutput::Records)
                    }
                }
            }
            OperationName::RunWrap(method) => adapter
                .run_wrapped(*method, call, true)
                .wait()
                .await
                .map(OperationOutput::Records),
        }
    }

    fn reject_input(&self, call: &OperationArgs) -> Result<()> {
        match call.input {
            Some(_) => Err(self.invalid("does not take an input record")),
            None => Ok(()),
        }
    }

    fn invalid(&self, reason: &str) -> AdapterError {
        AdapterError::InvalidArguments {
            operation: self.name.to_string(),
            reason: reason.to_string(),
        }
    }
}
