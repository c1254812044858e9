use p4_types::{Record, SessionError, SpecFieldTable};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ports::outbound::BlockingSession;

type Responder =
    Box<dyn FnMut(&[String], &[Record]) -> Result<Vec<Record>, SessionError> + Send + 'static>;

/// Scriptable in-memory session for tests.
///
/// Replies are scripted per command name; unscripted commands succeed with
/// no records. Every call (including connect and disconnect) is written to
/// a shared [`SessionJournal`] with its enter and exit instants, so tests can
/// check ordering and overlap after the session has been moved into an
/// adapter.
#[derive(Default)]
pub struct InMemorySession {
    connected: bool,
    input: Vec<Record>,
    responders: HashMap<String, Responder>,
    connect_error: Option<SessionError>,
    disconnect_error: Option<SessionError>,
    latency: Option<Duration>,
    spec_fields: Option<SpecFieldTable>,
    journal: SessionJournal,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out connected.
    #[must_use]
    pub fn connected(mut self) -> Self {
        self.connected = true;
        self
    }

    /// Reply to every run of `command` with `records`.
    #[must_use]
    pub fn respond(self, command: &str, records: Vec<Record>) -> Self {
        self.respond_with(command, move |_, _| Ok(records.clone()))
    }

    /// Reply to `command` by calling `responder` with the args and the
    /// input buffer consumed by the run.
    #[must_use]
    pub fn respond_with<F>(mut self, command: &str, responder: F) -> Self
    where
        F: FnMut(&[String], &[Record]) -> Result<Vec<Record>, SessionError> + Send + 'static,
    {
        self.responders
            .insert(command.to_string(), Box::new(responder));
        self
    }

    /// Fail every run of `command` with `error`.
    #[must_use]
    pub fn fail(self, command: &str, error: SessionError) -> Self {
        self.respond_with(command, move |_, _| Err(error.clone()))
    }

    #[must_use]
    pub fn fail_connect(mut self, error: SessionError) -> Self {
        self.connect_error = Some(error);
        self
    }

    #[must_use]
    pub fn fail_disconnect(mut self, error: SessionError) -> Self {
        self.disconnect_error = Some(error);
        self
    }

    /// Sleep for `latency` inside every call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Report `table` instead of the standard spec-field table.
    #[must_use]
    pub fn with_spec_fields(mut self, table: SpecFieldTable) -> Self {
        self.spec_fields = Some(table);
        self
    }

    /// Handle to the call journal, valid after the session is moved.
    #[must_use]
    pub fn journal(&self) -> SessionJournal {
        self.journal.clone()
    }

    fn record<T>(
        &mut self,
        command: &str,
        args: &[String],
        call: impl FnOnce(&mut Self, &[Record]) -> T,
    ) -> T {
        let active = self.journal.enter();
        let input = std::mem::take(&mut self.input);
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        let result = call(self, &input);
        active.finish(command, args, input);
        result
    }
}

impl BlockingSession for InMemorySession {
    fn connect(&mut self) -> Result<(), SessionError> {
        self.record("connect", &[], |session, _| match session.connect_error.clone() {
            Some(err) => Err(err),
            None => {
                session.connected = true;
                Ok(())
            }
        })
    }

    fn disconnect(&mut self) -> Result<(), SessionError> {
        self.record("disconnect", &[], |session, _| {
            match session.disconnect_error.clone() {
                Some(err) => Err(err),
                None => {
                    session.connected = false;
                    Ok(())
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn run(&mut self, command: &str, args: &[String]) -> Result<Vec<Record>, SessionError> {
        self.record(command, args, |session, input| {
            match session.responders.get_mut(command) {
                Some(responder) => responder(args, input),
                None => Ok(Vec::new()),
            }
        })
    }

    fn set_input(&mut self, input: Vec<Record>) {
        self.input = input;
    }

    fn spec_fields(&self) -> SpecFieldTable {
        self.spec_fields
            .clone()
            .unwrap_or_else(SpecFieldTable::standard)
    }
}

/// One journaled session call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub command: String,
    pub args: Vec<String>,
    /// Input buffer consumed by the call.
    pub input: Vec<Record>,
    pub started: Instant,
    pub finished: Instant,
}

#[derive(Debug, Default)]
struct JournalState {
    calls: Vec<CallRecord>,
    active: usize,
    max_active: usize,
}

/// Shared, append-only log of session calls.
#[derive(Debug, Clone, Default)]
pub struct SessionJournal {
    state: Arc<Mutex<JournalState>>,
}

impl SessionJournal {
    /// Calls in completion order.
    #[must_use]
    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.lock().calls.clone()
    }

    /// Command names in completion order.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .map(|call| call.command.clone())
            .collect()
    }

    /// Number of completed calls of `command`.
    #[must_use]
    pub fn count(&self, command: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.command == command)
            .count()
    }

    /// Highest number of calls ever in flight at once.
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.state.lock().max_active
    }

    /// Whether any two completed calls overlapped in time.
    #[must_use]
    pub fn has_overlap(&self) -> bool {
        let mut intervals: Vec<_> = self
            .state
            .lock()
            .calls
            .iter()
            .map(|call| (call.started, call.finished))
            .collect();
        intervals.sort();
        intervals
            .windows(2)
            .any(|pair| pair[1].0 < pair[0].1)
    }

    fn enter(&self) -> ActiveCall {
        let mut state = self.state.lock();
        state.active += 1;
        state.max_active = state.max_active.max(state.active);
        ActiveCall {
            journal: self.clone(),
            started: Instant::now(),
        }
    }
}

/// Marks a call in flight until dropped, including when the call panics.
struct ActiveCall {
    journal: SessionJournal,
    started: Instant,
}

impl ActiveCall {
    fn finish(self, command: &str, args: &[String], input: Vec<Record>) {
        self.journal.state.lock().calls.push(CallRecord {
            command: command.to_string(),
            args: args.to_vec(),
            input,
            started: self.started,
            finished: Instant::now(),
        });
    }
}

impl Drop for ActiveCall {
    fn drop(&mut self) {
        self.journal.state.lock().active -= 1;
    }
}
