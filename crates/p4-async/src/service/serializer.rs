//! # Execution Serializer
//!
//! Runs synchronous calls against a single session, one at a time.
//!
//! ## Model
//!
//! ```text
//!  caller tasks                     worker thread
//!  ────────────                     ─────────────
//!  submit(f1) ──┐
//!  submit(f2) ──┼──► FIFO queue ──► pop ─► lock gate ─► f(&mut session) ─► reply
//!  submit(f3) ──┘                                                     │
//!       ▲                                                             │
//!       └──────────── PendingOperation (oneshot) ◄────────────────────┘
//! ```
//!
//! - The gate is a mutex around the session. Every call, queued or inline,
//!   holds it for exactly the duration of the call.
//! - Queued calls are consumed by one dedicated thread, so they run strictly
//!   in submission order.
//! - `submit` never blocks; callers suspend only when awaiting the returned
//!   `PendingOperation`.
//! - A call whose `PendingOperation` was dropped before the worker reached
//!   it is skipped. A call already running finishes and its result is
//!   discarded. Detached calls have no caller and always run.
//! - The backlog is unbounded. Crossing `backlog_warn_threshold` is logged,
//!   nothing is rejected.

use parking_lot::Mutex;
use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};

type Job<S> = Box<dyn FnOnce(&Mutex<S>, &Counters) -> JobOutcome + Send>;

struct Envelope<S> {
    seq: u64,
    label: String,
    job: Job<S>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobOutcome {
    Completed,
    Failed,
    Panicked,
    Skipped,
}

impl JobOutcome {
    fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Completed,
            Err(AdapterError::WorkerPanicked(_)) => Self::Panicked,
            Err(_) => Self::Failed,
        }
    }
}

/// Serializer metrics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerStats {
    /// Calls queued but not yet picked up by the worker.
    pub queue_depth: usize,
    /// Calls that returned `Ok`.
    pub completed: u64,
    /// Calls that returned `Err` or panicked.
    pub failed: u64,
    /// Queued calls abandoned by their caller before they started.
    pub skipped: u64,
}

#[derive(Default)]
struct Counters {
    queue_depth: AtomicUsize,
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: JobOutcome) {
        let counter = match outcome {
            JobOutcome::Completed => &self.completed,
            JobOutcome::Failed | JobOutcome::Panicked => &self.failed,
            JobOutcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct Shared<S> {
    gate: Arc<Mutex<S>>,
    /// `None` once shut down.
    sender: Mutex<Option<mpsc::UnboundedSender<Envelope<S>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
    sequence: AtomicU64,
    config: AdapterConfig,
}

/// Serializes calls against one session.
///
/// Cloning yields another handle to the same gate and worker. The worker
/// exits once every handle is dropped (or [`shutdown`](Self::shutdown) is
/// called) and the queue is drained.
pub struct ExecutionSerializer<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for ExecutionSerializer<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: Send + 'static> ExecutionSerializer<S> {
    /// Take ownership of `session` and start its worker thread.
    pub fn start(session: S, config: AdapterConfig) -> Result<Self> {
        let (sender, queue) = mpsc::unbounded_channel();
        let gate = Arc::new(Mutex::new(session));
        let counters = Arc::new(Counters::default());

        let worker = std::thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn({
                let gate = Arc::clone(&gate);
                let counters = Arc::clone(&counters);
                move || worker_loop(&gate, queue, &counters)
            })
            .map_err(|e| AdapterError::WorkerStart(e.to_string()))?;

        Ok(Self {
            shared: Arc::new(Shared {
                gate,
                sender: Mutex::new(Some(sender)),
                worker: Mutex::new(Some(worker)),
                counters,
                sequence: AtomicU64::new(0),
                config,
            }),
        })
    }

    /// Queue `f` to run on the worker under the gate.
    ///
    /// Returns immediately. `label` only appears in log events.
    pub fn submit<T, F>(&self, label: impl Into<String>, f: F) -> PendingOperation<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> Result<T> + Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let job: Job<S> = Box::new(move |gate, counters| {
            if reply.is_closed() {
                counters.record(JobOutcome::Skipped);
                return JobOutcome::Skipped;
            }
            let result = run_gated(gate, f);
            let outcome = JobOutcome::of(&result);
            counters.record(outcome);
            // The caller may have stopped waiting while the call ran
            let _ = reply.send(result);
            outcome
        });

        self.enqueue(Envelope {
            seq: self.shared.sequence.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            job,
        });
        PendingOperation { receiver }
    }

    /// Queue `f` with no caller waiting on it.
    ///
    /// The call runs even though nothing observes it; a failure is only
    /// logged. Usable from `Drop`, where nothing can be awaited.
    pub fn submit_detached<F>(&self, label: impl Into<String>, f: F)
    where
        F: FnOnce(&mut S) -> Result<()> + Send + 'static,
    {
        let label = label.into();
        let job: Job<S> = Box::new({
            let label = label.clone();
            move |gate, counters| {
                let result = run_gated(gate, f);
                let outcome = JobOutcome::of(&result);
                counters.record(outcome);
                if let Err(e) = result {
                    warn!(command = %label, error = %e, "Detached session call failed");
                }
                outcome
            }
        });

        self.enqueue(Envelope {
            seq: self.shared.sequence.fetch_add(1, Ordering::Relaxed),
            label,
            job,
        });
    }

    /// Run `f` on the calling thread under the gate.
    ///
    /// Blocks until the gate is free and `f` returns. Inline calls contend
    /// with the worker for the gate and are not ordered against the queue.
    pub fn execute_inline<T>(&self, label: &str, f: impl FnOnce(&mut S) -> Result<T>) -> Result<T> {
        if self.shared.config.log_commands {
            debug!(command = %label, "Session call running inline");
        }
        let result = run_gated(&self.shared.gate, f);
        self.shared.counters.record(JobOutcome::of(&result));
        result
    }

    /// Return a snapshot of serializer metrics.
    #[must_use]
    pub fn stats(&self) -> SerializerStats {
        let counters = &self.shared.counters;
        SerializerStats {
            queue_depth: counters.queue_depth.load(Ordering::Acquire),
            completed: counters.completed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting calls, let the worker drain the queue, and join it.
    ///
    /// Blocks the calling thread until the backlog has run. Later
    /// submissions fail with [`AdapterError::WorkerUnavailable`].
    pub fn shutdown(&self) {
        self.shared.sender.lock().take();
        if let Some(worker) = self.shared.worker.lock().take() {
            if worker.join().is_err() {
                error!("Session worker terminated abnormally");
            }
        }
    }

    fn enqueue(&self, envelope: Envelope<S>) {
        let sender = self.shared.sender.lock();
        let Some(sender) = sender.as_ref() else {
            debug!(seq = envelope.seq, command = %envelope.label, "Session worker stopped, call dropped");
            return;
        };

        let config = &self.shared.config;
        let depth = self.shared.counters.queue_depth.fetch_add(1, Ordering::AcqRel) + 1;
        if config.backlog_warn_threshold.checked_add(1) == Some(depth) {
            warn!(
                queue_depth = depth,
                threshold = config.backlog_warn_threshold,
                "Session backlog above threshold"
            );
        }
        if config.log_commands {
            debug!(seq = envelope.seq, command = %envelope.label, queue_depth = depth, "Session call queued");
        }

        if let Err(mpsc::error::SendError(envelope)) = sender.send(envelope) {
            self.shared.counters.queue_depth.fetch_sub(1, Ordering::AcqRel);
            warn!(seq = envelope.seq, command = %envelope.label, "Session worker gone, call dropped");
        }
    }
}

/// Eventual result of a submitted call.
///
/// Dropping it before the worker starts the call cancels the call.
#[must_use = "dropping a pending operation before it starts cancels it"]
pub struct PendingOperation<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> PendingOperation<T> {
    /// An operation that has already finished with `result`.
    pub fn ready(result: Result<T>) -> Self {
        let (reply, receiver) = oneshot::channel();
        let _ = reply.send(result);
        Self { receiver }
    }
}

impl<T> Future for PendingOperation<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|reply| reply.unwrap_or_else(|_| Err(AdapterError::WorkerUnavailable)))
    }
}

fn run_gated<S, T>(gate: &Mutex<S>, f: impl FnOnce(&mut S) -> Result<T>) -> Result<T> {
    let mut session = gate.lock();
    catch_unwind(AssertUnwindSafe(|| f(&mut *session)))
        .unwrap_or_else(|payload| Err(AdapterError::WorkerPanicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "(non-string panic)".to_string())
}

fn worker_loop<S>(
    gate: &Mutex<S>,
    mut queue: mpsc::UnboundedReceiver<Envelope<S>>,
    counters: &Counters,
) {
    info!("Session worker started");

    while let Some(Envelope { seq, label, job }) = queue.blocking_recv() {
        counters.queue_depth.fetch_sub(1, Ordering::AcqRel);

        match job(gate, counters) {
            JobOutcome::Completed => debug!(seq, command = %label, "Session call completed"),
            JobOutcome::Failed => debug!(seq, command = %label, "Session call failed"),
            JobOutcome::Panicked => error!(seq, command = %label, "Session call panicked"),
            JobOutcome::Skipped => debug!(seq, command = %label, "Session call skipped, caller gone"),
        }
    }

    info!("Session worker stopped");
}
