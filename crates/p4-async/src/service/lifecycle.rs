//! # Session Lifecycle
//!
//! Scoped use of an adapter that always ends with the session disconnected.
//! Entering a scope does not connect.
//!
//! A scope that never reaches its exit step (cancelled by a timeout or a
//! `select!`, or unwound by a panic in the body) still queues the
//! disconnect from `Drop`. That call runs in the background.

use std::future::Future;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AdapterError, Result};
use crate::ports::BlockingSession;
use crate::service::adapter::P4Async;
use crate::service::serializer::PendingOperation;

impl<S: BlockingSession> P4Async<S> {
    /// Run `body`, then disconnect the session if it is connected.
    ///
    /// The disconnect step runs whether or not `body` failed. An error from
    /// `body` takes precedence over a failed disconnect, which is then only
    /// logged. Dropping the scope early queues the disconnect instead.
    pub async fn scope<'a, F, Fut, T, E>(&'a self, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&'a Self) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<AdapterError>,
    {
        let guard = DisconnectOnDrop::arm(self);
        let outcome = body(self).await;
        let closed = self.close().await;
        guard.disarm();

        match (outcome, closed) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err.into()),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(
                    instance_id = %self.instance_id(),
                    error = %close_err,
                    "Disconnect on scope exit failed"
                );
                Err(e)
            }
        }
    }

    /// Disconnect if connected. Resolves to whether a disconnect ran.
    ///
    /// The check and the disconnect are one queued call.
    pub fn close(&self) -> PendingOperation<bool> {
        let instance_id = self.instance_id();
        self.serializer
            .submit("close", move |session| disconnect_if_connected(session, instance_id))
    }
}

fn disconnect_if_connected<S: BlockingSession>(session: &mut S, instance_id: Uuid) -> Result<bool> {
    if !session.is_connected() {
        return Ok(false);
    }
    session
        .disconnect()
        .map_err(|e| AdapterError::command("disconnect", e))?;
    debug!(%instance_id, "Session disconnected on close");
    Ok(true)
}

/// Queues a detached disconnect if dropped while armed.
struct DisconnectOnDrop<'a, S: BlockingSession> {
    adapter: &'a P4Async<S>,
    armed: bool,
}

impl<'a, S: BlockingSession> DisconnectOnDrop<'a, S> {
    fn arm(adapter: &'a P4Async<S>) -> Self {
        Self {
            adapter,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S: BlockingSession> Drop for DisconnectOnDrop<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let instance_id = self.adapter.instance_id();
        warn!(%instance_id, "Scope exited early, disconnecting in background");
        self.adapter.serializer.submit_detached("close", move |session| {
            disconnect_if_connected(session, instance_id).map(|_| ())
        });
    }
}
