//! # Protocol Helpers
//!
//! Multi-step session idioms exposed as single asynchronous operations.
//!
//! | Helper | Session calls |
//! |--------|---------------|
//! | `fetch_one` | `cmd -o args...`, pick one record |
//! | `save_one` | set input, `cmd -i args...` (one gated job) |
//! | `iterate_many` | `cmd args...`, then `list_field -o <key>` per summary |
//!
//! Every helper submits eagerly except `iterate_many`, whose stream submits
//! its listing on first poll.

use futures::stream::{self, BoxStream, Stream, StreamExt};
use p4_types::{Record, SpecFieldTable};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{AdapterError, Result};
use crate::ports::BlockingSession;
use crate::service::serializer::{ExecutionSerializer, PendingOperation};

/// Submit `command args...`.
pub fn run<S: BlockingSession>(
    serializer: &ExecutionSerializer<S>,
    command: &str,
    args: Vec<String>,
) -> PendingOperation<Vec<Record>> {
    let command = command.to_string();
    serializer.submit(command.clone(), move |session| {
        session
            .run(&command, &args)
            .map_err(|e| AdapterError::command(&command, e))
    })
}

/// Submit `command -o args...` and resolve to one record.
pub fn fetch_one<S: BlockingSession>(
    serializer: &ExecutionSerializer<S>,
    command: &str,
    args: Vec<String>,
) -> PendingOperation<Record> {
    let command = command.to_string();
    let args = with_flag("-o", args);
    serializer.submit(command.clone(), move |session| {
        let records = session
            .run(&command, &args)
            .map_err(|e| AdapterError::command(&command, e))?;
        pick_one(&command, records)
    })
}

/// Submit `input` through the session input buffer and run `command -i rest...`.
///
/// Both steps run inside one job, so no other call can touch the input
/// buffer in between.
pub fn save_one<S: BlockingSession>(
    serializer: &ExecutionSerializer<S>,
    command: &str,
    input: Record,
    rest: Vec<String>,
) -> PendingOperation<Vec<Record>> {
    let command = command.to_string();
    let args = with_flag("-i", rest);
    serializer.submit(command.clone(), move |session| {
        session.set_input(vec![input]);
        session
            .run(&command, &args)
            .map_err(|e| AdapterError::command(&command, e))
    })
}

/// Lazily fetch the full spec of every item `command` lists.
///
/// Fails with [`AdapterError::UnknownListableCommand`] before anything is
/// submitted if `command` is not in `table`.
pub fn iterate_many<S: BlockingSession>(
    serializer: &ExecutionSerializer<S>,
    table: &SpecFieldTable,
    command: &str,
    args: Vec<String>,
) -> Result<RecordStream> {
    let fields = table
        .get(command)
        .ok_or_else(|| AdapterError::UnknownListableCommand(command.to_string()))?;

    let walk = Walk {
        serializer: serializer.clone(),
        command: command.to_string(),
        list_field: fields.list_field.clone(),
        key_field: fields.key_field.clone(),
    };
    let initial = WalkState::Listing(args);

    Ok(RecordStream::new(stream::unfold(
        (walk, initial),
        |(walk, state)| async move {
            let (item, next) = walk.step(state).await?;
            Some((item, (walk, next)))
        },
    )))
}

/// Finite, non-restartable stream of fetched records.
///
/// The first error ends the stream.
#[must_use = "streams do nothing unless polled"]
pub struct RecordStream {
    inner: BoxStream<'static, Result<Record>>,
}

impl RecordStream {
    pub fn new(inner: impl Stream<Item = Result<Record>> + Send + 'static) -> Self {
        Self {
            inner: inner.boxed(),
        }
    }
}

impl Stream for RecordStream {
    type Item = Result<Record>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream").finish_non_exhaustive()
    }
}

struct Walk<S> {
    serializer: ExecutionSerializer<S>,
    command: String,
    list_field: String,
    key_field: String,
}

enum WalkState {
    Listing(Vec<String>),
    Fetching(VecDeque<Record>),
    Done,
}

impl<S: BlockingSession> Walk<S> {
    /// Produce the next item, or `None` when the walk is over.
    async fn step(&self, mut state: WalkState) -> Option<(Result<Record>, WalkState)> {
        loop {
            state = match state {
                WalkState::Done => return None,
                WalkState::Listing(args) => {
                    match run(&self.serializer, &self.command, args).await {
                        Ok(summaries) => WalkState::Fetching(summaries.into()),
                        Err(e) => return Some((Err(e), WalkState::Done)),
                    }
                }
                WalkState::Fetching(mut summaries) => {
                    let summary = summaries.pop_front()?;
                    let Some(key) = summary.field(&self.key_field) else {
                        let err = AdapterError::MissingKeyField {
                            command: self.command.clone(),
                            field: self.key_field.clone(),
                        };
                        return Some((Err(err), WalkState::Done));
                    };
                    let fetched =
                        fetch_one(&self.serializer, &self.list_field, vec![key.to_string()]).await;
                    let next = match fetched {
                        Ok(_) => WalkState::Fetching(summaries),
                        Err(_) => WalkState::Done,
                    };
                    return Some((fetched, next));
                }
            };
        }
    }
}

fn with_flag(flag: &str, args: Vec<String>) -> Vec<String> {
    std::iter::once(flag.to_string()).chain(args).collect()
}

/// First mapping-shaped record, else the first record of any kind.
fn pick_one(command: &str, records: Vec<Record>) -> Result<Record> {
    let index = records.iter().position(Record::is_structured).unwrap_or(0);
    records
        .into_iter()
        .nth(index)
        .ok_or_else(|| AdapterError::EmptyResult {
            command: command.to_string(),
        })
}
