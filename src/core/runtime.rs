//! Client loop: owns the [`Client`] and executes scheduled jobs.
//!
//! **Architecture**: `ClientRuntime` holds the only `Client` instance and
//! the receiving half of the job queue. `run()` alternates between two
//! duties on one thread: execute queued jobs the moment they arrive
//! (FIFO), and advance the simulation once per tick interval. Jobs are
//! never run anywhere else, so everything a job sees is single-threaded.
//!
//! **Used by**: `main.rs` (runs the loop on the main thread), tests
//! (drive the queue manually with `run_next`/`drain_pending`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use log::{debug, info};

use crate::core::client::Client;
use crate::core::invoke::{ClientHandle, ScheduledJob};

/// Requests a running client loop to stop from another thread.
///
/// The loop notices the flag on its next wakeup, so shutdown latency is
/// bounded by one tick interval.
#[derive(Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Owns the client state and the job queue consumer.
pub struct ClientRuntime {
    client: Client,
    jobs: Receiver<ScheduledJob>,
    tick_interval: Duration,
    stop: Arc<AtomicBool>,
}

impl ClientRuntime {
    /// Builds a runtime around `client` and returns it together with the
    /// first [`ClientHandle`]. Clone the handle for additional callers.
    pub fn new(client: Client, tick_interval: Duration) -> (Self, ClientHandle) {
        let (tx, rx) = unbounded();
        let runtime = Self {
            client,
            jobs: rx,
            tick_interval,
            stop: Arc::new(AtomicBool::new(false)),
        };
        (runtime, ClientHandle::new(tx))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { flag: Arc::clone(&self.stop) }
    }

    /// Runs the client loop on the current thread.
    ///
    /// Returns when every [`ClientHandle`] has been dropped or a
    /// [`StopHandle`] fired. Jobs already queued at shutdown are dropped;
    /// their callers observe a disconnect.
    pub fn run(mut self) {
        info!("Client loop started (tick interval {:?})", self.tick_interval);
        let mut next_tick = Instant::now() + self.tick_interval;

        loop {
            if self.stop.load(Ordering::Relaxed) {
                debug!("Client loop stop requested");
                break;
            }

            match self.jobs.recv_deadline(next_tick) {
                Ok(job) => job.run(&mut self.client),
                Err(RecvTimeoutError::Timeout) => {} // tick is due
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("All client handles dropped");
                    break;
                }
            }

            // Advance the simulation whenever its slot has passed, even if
            // a steady stream of jobs keeps the queue busy.
            let now = Instant::now();
            if now >= next_tick {
                self.client.tick();
                next_tick = now + self.tick_interval;
            }
        }

        info!("Client loop stopped after {} ticks", self.client.tick_count());
    }

    /// Executes at most one queued job, waiting up to `timeout` for one to
    /// arrive. Returns whether a job ran. No ticking happens here.
    pub fn run_next(&mut self, timeout: Duration) -> bool {
        match self.jobs.recv_timeout(timeout) {
            Ok(job) => {
                job.run(&mut self.client);
                true
            }
            Err(_) => false,
        }
    }

    /// Executes everything currently queued without blocking and returns
    /// the number of jobs run.
    pub fn drain_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.jobs.try_recv() {
            job.run(&mut self.client);
            ran += 1;
        }
        ran
    }
}
