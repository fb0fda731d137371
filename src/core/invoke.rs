//! Cross-thread invocation bridge between worker threads and the client thread.
//!
//! **Architecture**: workers never touch `Client` memory. A worker wraps
//! its computation in a [`ScheduledJob`] together with the sending half of
//! a one-shot reply channel, pushes the job onto the client loop's FIFO
//! queue, and blocks on the receiving half. The client thread pops jobs in
//! submission order, runs each against `&mut Client`, and sends the
//! outcome back through that job's own channel.
//!
//! ```text
//! ┌──────────────────┐  unbounded FIFO queue   ┌───────────────────┐
//! │  HTTP worker N   │ ── ScheduledJob ──────▶ │   Client thread   │
//! │ invoke(|c| ...)  │                         │  job(&mut Client) │
//! │ blocks on reply  │ ◀── Result<T, E> ────── │  reply.send(...)  │
//! └──────────────────┘   bounded(1) per call   └───────────────────┘
//! ```
//!
//! Each call gets its own `bounded(1)` channel, so outcomes are written
//! once and read once by construction, and concurrent callers can never
//! observe each other's results. The wait is bounded: callers give up
//! after a deadline and get [`InvokeError::TimedOut`]; the client thread
//! still finishes the job and its late reply is dropped on the floor.
//!
//! A job that returns an error or panics resolves the caller's outcome as
//! a failure; the client loop itself never unwinds.
//!
//! **Used by**: `server::api` (one `invoke` per HTTP request),
//! `core::runtime` (executes the queued jobs).

use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::core::client::Client;

/// How long [`ClientHandle::invoke`] waits for the client thread.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Why an invocation produced no value.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The client loop is gone (not started yet, or already shut down).
    #[error("client loop is not running")]
    Disconnected,
    /// The client thread did not finish the job within the deadline.
    #[error("no reply from client thread within {0:?}")]
    TimedOut(Duration),
    /// The job ran on the client thread and returned an error.
    #[error("job failed on client thread: {0:#}")]
    Job(anyhow::Error),
    /// The job panicked on the client thread; the loop survived.
    #[error("job panicked on client thread: {0}")]
    Panicked(String),
}

type Job = Box<dyn FnOnce(&mut Client) + Send + 'static>;

/// One unit of work queued for the client thread: a type-erased closure
/// plus a label for tracing. Reply plumbing, if any, is captured inside
/// the closure.
pub struct ScheduledJob {
    label: &'static str,
    job: Job,
}

impl ScheduledJob {
    /// Runs the job. Client thread only; consumed on use.
    pub(crate) fn run(self, client: &mut Client) {
        trace!("Running job '{}'", self.label);
        (self.job)(client);
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// Gateway to the client thread. Cheap to clone; holds nothing but the
/// sending half of the job queue, so it carries no client state and can be
/// handed to any number of worker threads.
#[derive(Clone)]
pub struct ClientHandle {
    tx: Sender<ScheduledJob>,
}

impl ClientHandle {
    pub(crate) fn new(tx: Sender<ScheduledJob>) -> Self {
        Self { tx }
    }

    /// Schedules `f` on the client thread and returns immediately.
    ///
    /// Fire-and-forget: panics in `f` are caught and logged, delivery
    /// failures (loop already stopped) are logged and dropped.
    pub fn schedule<F>(&self, label: &'static str, f: F)
    where
        F: FnOnce(&mut Client) + Send + 'static,
    {
        let job = ScheduledJob {
            label,
            job: Box::new(move |client| {
                let guarded = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(client)));
                if let Err(payload) = guarded {
                    warn!("Scheduled job '{}' panicked: {}", label, panic_message(payload));
                }
            }),
        };
        if self.tx.send(job).is_err() {
            warn!("Dropped job '{}': client loop is not running", label);
        }
    }

    /// Runs `f` on the client thread and blocks until its outcome arrives,
    /// up to [`DEFAULT_REPLY_TIMEOUT`].
    pub fn invoke<T, F>(&self, label: &'static str, f: F) -> Result<T, InvokeError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Client) -> anyhow::Result<T> + Send + 'static,
    {
        self.invoke_timeout(label, DEFAULT_REPLY_TIMEOUT, f)
    }

    /// Like [`invoke`](Self::invoke) with an explicit reply deadline.
    ///
    /// On timeout the job is not cancelled: the client thread will still
    /// execute it in queue order and the reply goes nowhere.
    pub fn invoke_timeout<T, F>(
        &self,
        label: &'static str,
        timeout: Duration,
        f: F,
    ) -> Result<T, InvokeError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Client) -> anyhow::Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = bounded::<Result<T, InvokeError>>(1);

        let job = ScheduledJob {
            label,
            job: Box::new(move |client| {
                let guarded = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(client)));
                let outcome = match guarded {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(err)) => Err(InvokeError::Job(err)),
                    Err(payload) => Err(InvokeError::Panicked(panic_message(payload))),
                };
                if reply_tx.send(outcome).is_err() {
                    debug!("Reply for '{}' dropped: caller stopped waiting", label);
                }
            }),
        };

        self.tx.send(job).map_err(|_| InvokeError::Disconnected)?;
        trace!("Dispatched '{}', waiting up to {:?}", label, timeout);

        match reply_rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!("'{}' timed out after {:?}", label, timeout);
                Err(InvokeError::TimedOut(timeout))
            }
            // Queue torn down with the job still inside it.
            Err(RecvTimeoutError::Disconnected) => Err(InvokeError::Disconnected),
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
