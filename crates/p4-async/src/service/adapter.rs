//! # Async Adapter
//!
//! `P4Async` owns one blocking session and exposes it asynchronously.
//! Every session call goes through the adapter's [`ExecutionSerializer`].

use async_trait::async_trait;
use p4_types::{Record, SpecFieldTable};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AdapterConfig;
use crate::domain::{CommandForm, OperationArgs, PreparedCommand, RunWrapMethod, SimpleMethod};
use crate::error::{AdapterError, Result};
use crate::ports::{AsyncCommandApi, BlockingSession};
use crate::service::protocol::{self, RecordStream};
use crate::service::serializer::{ExecutionSerializer, PendingOperation, SerializerStats};

/// Result of a call that may run inline or on the worker.
#[must_use]
pub enum Execution<T> {
    /// Ran inline on the calling thread.
    Completed(Result<T>),
    /// Queued on the worker.
    Pending(PendingOperation<T>),
}

impl<T> Execution<T> {
    fn failed(error: AdapterError, asynchronous: bool) -> Self {
        if asynchronous {
            Self::Pending(PendingOperation::ready(Err(error)))
        } else {
            Self::Completed(Err(error))
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// The inline result, or `None` if the call was queued.
    pub fn into_completed(self) -> Option<Result<T>> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Pending(_) => None,
        }
    }

    /// Resolve either form.
    pub async fn wait(self) -> Result<T> {
        match self {
            Self::Completed(result) => result,
            Self::Pending(pending) => pending.await,
        }
    }
}

/// Async adapter over a blocking session.
///
/// Calls against the session never overlap, and queued calls run in the
/// order they were made. Constructing the adapter does not connect.
pub struct P4Async<S> {
    instance_id: Uuid,
    pub(crate) serializer: ExecutionSerializer<S>,
    spec_fields: SpecFieldTable,
}

impl<S: BlockingSession> P4Async<S> {
    /// Wrap `session` with the default configuration.
    pub fn new(session: S) -> Result<Self> {
        Self::with_config(session, AdapterConfig::default())
    }

    pub fn with_config(session: S, config: AdapterConfig) -> Result<Self> {
        let instance_id = Uuid::new_v4();
        let spec_fields = session.spec_fields();
        let worker = config.worker_name.clone();
        let serializer = ExecutionSerializer::start(session, config)?;

        info!(
            %instance_id,
            worker = %worker,
            listable_commands = spec_fields.len(),
            "Async session adapter started"
        );

        Ok(Self {
            instance_id,
            serializer,
            spec_fields,
        })
    }

    #[must_use]
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Listable commands known to this adapter.
    #[must_use]
    pub fn spec_fields(&self) -> &SpecFieldTable {
        &self.spec_fields
    }

    #[must_use]
    pub fn stats(&self) -> SerializerStats {
        self.serializer.stats()
    }

    /// Stop the worker after it drains already-queued calls.
    pub async fn shutdown(&self) {
        let serializer = self.serializer.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || serializer.shutdown()).await {
            error!(instance_id = %self.instance_id, error = %e, "Session worker shutdown failed");
            return;
        }
        info!(instance_id = %self.instance_id, "Async session adapter stopped");
    }

    // =========================================================================
    // Synchronous escape hatch
    // =========================================================================

    /// Run `command args...` inline, or queue it when `asynchronous` is set.
    ///
    /// The inline form blocks the calling thread until the gate is free and
    /// the command returns.
    pub fn run(&self, command: &str, args: &[&str], asynchronous: bool) -> Execution<Vec<Record>> {
        if asynchronous {
            return Execution::Pending(self.arun(command, args));
        }
        let args = owned(args);
        Execution::Completed(self.serializer.execute_inline(command, |session| {
            session
                .run(command, &args)
                .map_err(|e| AdapterError::command(command, e))
        }))
    }

    /// Run a run-wrap method with its argument shaping.
    pub fn run_wrapped(
        &self,
        method: RunWrapMethod,
        call: OperationArgs,
        asynchronous: bool,
    ) -> Execution<Vec<Record>> {
        let form = CommandForm::new(method);
        let prepared = match form.prepare(call) {
            Ok(prepared) => prepared,
            Err(e) => return Execution::failed(e, asynchronous),
        };
        let job = move |session: &mut S| run_prepared(session, form, prepared);

        if asynchronous {
            Execution::Pending(self.serializer.submit(method.name(), job))
        } else {
            Execution::Completed(self.serializer.execute_inline(method.name(), job))
        }
    }

    /// `submit`, taking the change spec through the input buffer when given.
    pub fn run_submit(
        &self,
        change: Option<Record>,
        args: &[&str],
        asynchronous: bool,
    ) -> Execution<Vec<Record>> {
        self.run_wrapped(RunWrapMethod::Submit, with_input(args, change), asynchronous)
    }

    /// `shelve`, taking the change spec through the input buffer when given.
    pub fn run_shelve(
        &self,
        change: Option<Record>,
        args: &[&str],
        asynchronous: bool,
    ) -> Execution<Vec<Record>> {
        self.run_wrapped(RunWrapMethod::Shelve, with_input(args, change), asynchronous)
    }

    /// `shelve -d`. A lone change number is expanded to `-c <change>`.
    pub fn delete_shelve(&self, args: &[&str], asynchronous: bool) -> Execution<Vec<Record>> {
        self.run_wrapped(RunWrapMethod::DeleteShelve, OperationArgs::new(args.iter().copied()), asynchronous)
    }

    pub fn run_login(
        &self,
        password: Option<&str>,
        args: &[&str],
        asynchronous: bool,
    ) -> Execution<Vec<Record>> {
        let call = with_input(args, password.map(Record::text));
        self.run_wrapped(RunWrapMethod::Login, call, asynchronous)
    }

    /// Change the password. Pass an empty `old` when none is set yet.
    pub fn run_password(&self, old: &str, new: &str, asynchronous: bool) -> Execution<Vec<Record>> {
        self.run_wrapped(RunWrapMethod::Password, OperationArgs::new([old, new]), asynchronous)
    }

    /// `filelog`, keeping only the structured records.
    pub fn run_filelog(&self, args: &[&str], asynchronous: bool) -> Execution<Vec<Record>> {
        self.run_wrapped(RunWrapMethod::Filelog, OperationArgs::new(args.iter().copied()), asynchronous)
    }

    /// `print`, with each file's content chunks joined into one record.
    pub fn run_print(&self, args: &[&str], asynchronous: bool) -> Execution<Vec<Record>> {
        self.run_wrapped(RunWrapMethod::Print, OperationArgs::new(args.iter().copied()), asynchronous)
    }

    pub fn run_resolve(&self, args: &[&str], asynchronous: bool) -> Execution<Vec<Record>> {
        self.run_wrapped(RunWrapMethod::Resolve, OperationArgs::new(args.iter().copied()), asynchronous)
    }

    // =========================================================================
    // Async operations
    // =========================================================================

    /// Queue `command args...`.
    pub fn arun(&self, command: &str, args: &[&str]) -> PendingOperation<Vec<Record>> {
        protocol::run(&self.serializer, command, owned(args))
    }

    pub fn aconnect(&self) -> PendingOperation<()> {
        self.simple(SimpleMethod::Connect, |session| session.connect())
    }

    pub fn adisconnect(&self) -> PendingOperation<()> {
        self.simple(SimpleMethod::Disconnect, |session| session.disconnect())
    }

    pub fn ais_connected(&self) -> PendingOperation<bool> {
        self.serializer
            .submit("is_connected", |session| Ok(session.is_connected()))
    }

    pub fn arun_tickets(&self) -> PendingOperation<Vec<Record>> {
        self.simple(SimpleMethod::RunTickets, |session| session.run_tickets())
    }

    /// Queue `command -d args...`.
    pub fn adelete(&self, command: &str, args: &[&str]) -> PendingOperation<Vec<Record>> {
        let args = std::iter::once("-d").chain(args.iter().copied());
        protocol::run(&self.serializer, command, args.map(str::to_string).collect())
    }

    /// Fetch one spec record via `command -o args...`.
    pub fn afetch(&self, command: &str, args: &[&str]) -> PendingOperation<Record> {
        protocol::fetch_one(&self.serializer, command, owned(args))
    }

    /// Save `input` via `command -i args...`.
    pub fn asave(&self, command: &str, input: Record, args: &[&str]) -> PendingOperation<Vec<Record>> {
        protocol::save_one(&self.serializer, command, input, owned(args))
    }

    /// Lazily fetch the spec of every item `command` lists.
    pub fn aiterate(&self, command: &str, args: &[&str]) -> Result<RecordStream> {
        protocol::iterate_many(&self.serializer, &self.spec_fields, command, owned(args))
    }

    fn simple<T, F>(&self, method: SimpleMethod, call: F) -> PendingOperation<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> std::result::Result<T, p4_types::SessionError> + Send + 'static,
    {
        let name = method.name();
        self.serializer.submit(name, move |session| {
            call(session).map_err(|e| AdapterError::command(name, e))
        })
    }
}

fn run_prepared<S: BlockingSession>(
    session: &mut S,
    form: CommandForm,
    prepared: PreparedCommand,
) -> Result<Vec<Record>> {
    let PreparedCommand {
        command,
        args,
        input,
    } = prepared;
    if let Some(input) = input {
        session.set_input(input);
    }
    let records = session
        .run(&command, &args)
        .map_err(|e| AdapterError::command(&command, e))?;
    Ok(form.finish(records))
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_string()).collect()
}

fn with_input(args: &[&str], input: Option<Record>) -> OperationArgs {
    let call = OperationArgs::new(args.iter().copied());
    match input {
        Some(input) => call.with_input(input),
        None => call,
    }
}

#[async_trait]
impl<S: BlockingSession> AsyncCommandApi for P4Async<S> {
    async fn arun(&self, command: &str, args: &[&str]) -> Result<Vec<Record>> {
        P4Async::arun(self, command, args).await
    }

    async fn aconnect(&self) -> Result<()> {
        P4Async::aconnect(self).await
    }

    async fn adisconnect(&self) -> Result<()> {
        P4Async::adisconnect(self).await
    }

    async fn ais_connected(&self) -> Result<bool> {
        P4Async::ais_connected(self).await
    }

    async fn afetch(&self, command: &str, args: &[&str]) -> Result<Record> {
        P4Async::afetch(self, command, args).await
    }

    async fn asave(&self, command: &str, input: Record, args: &[&str]) -> Result<Vec<Record>> {
        P4Async::asave(self, command, input, args).await
    }

    async fn adelete(&self, command: &str, args: &[&str]) -> Result<Vec<Record>> {
        P4Async::adelete(self, command, args).await
    }

    fn aiterate(&self, command: &str, args: &[&str]) -> Result<RecordStream> {
        P4Async::aiterate(self, command, args)
    }
}
