//! # Recurring Scheduler
//!
//! A [`RecurringScheduler`] runs one [`Dispatch`] unit of work in its own Tokio task,
//! over and over, sleeping [`Dispatch::next_delay`] between runs, until the unit
//! reports it is exhausted or someone calls [`RecurringScheduler::stop`].
//!
//! ```text
//!   start() ──► running ──dispatch() == false──► stopped
//!                  │  ▲                            ▲
//!                  │  └── sleep(next_delay()) ◄────┤ (true)
//!                  └────────── stop() ─────────────┘
//! ```
//!
//! The loop checks a cancellation token at the top of every cycle and while sleeping.
//! A unit of work that is already running is never interrupted.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How often [`RecurringScheduler::wait_until_completed`] re-checks the state.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A repeatable unit of work.
#[async_trait]
pub trait Dispatch: Send + 'static {
    /// Performs one unit of work. Returns `false` once there is nothing left to do.
    async fn dispatch(&mut self) -> bool;

    /// Delay before the next call to [`dispatch`](Self::dispatch).
    fn next_delay(&mut self) -> Duration;
}

/// Drives a [`Dispatch`] on a background task.
pub struct RecurringScheduler<D: Dispatch> {
    name: String,
    dispatcher: Mutex<Option<D>>,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<D: Dispatch> RecurringScheduler<D> {
    pub fn new(name: impl Into<String>, dispatcher: D) -> Self {
        Self {
            name: name.into(),
            dispatcher: Mutex::new(Some(dispatcher)),
            running: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawns the loop; the first unit of work runs right away.
    ///
    /// Must be called from within a Tokio runtime. A scheduler runs at most once:
    /// later calls return `false` and do nothing.
    pub fn start(&self) -> bool {
        let Some(dispatcher) = self.dispatcher.lock().take() else {
            warn!(scheduler = %self.name, "Already started");
            return false;
        };
        if self.cancel.is_cancelled() {
            warn!(scheduler = %self.name, "Stopped before start");
            return false;
        }

        self.running.store(true, Ordering::SeqCst);
        let handle = tokio::spawn(run_loop(
            self.name.clone(),
            dispatcher,
            self.cancel.clone(),
            self.running.clone(),
        ));
        *self.handle.lock() = Some(handle);
        info!(scheduler = %self.name, "Started");
        true
    }

    /// Stops re-arming. Safe to call any number of times.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!(scheduler = %self.name, "Stop requested");
        }
        self.cancel.cancel();
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Polls until the scheduler is stopped.
    pub async fn wait_until_completed(&self) {
        while self.is_running() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Waits for the background task itself to finish.
    pub async fn join(&self) -> Result<(), String> {
        let handle = self.handle.lock().take();
        match handle {
            Some(handle) => handle
                .await
                .map_err(|e| format!("Scheduler {} failed: {e}", self.name)),
            None => Ok(()),
        }
    }
}

async fn run_loop<D: Dispatch>(
    name: String,
    mut dispatcher: D,
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
) {
    let mut ticks: u64 = 0;
    while !cancel.is_cancelled() {
        ticks += 1;
        if !dispatcher.dispatch().await {
            info!(scheduler = %name, ticks, "Exhausted");
            break;
        }
        let delay = dispatcher.next_delay();
        debug!(scheduler = %name, ticks, ?delay, "Re-armed");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
    running.store(false, Ordering::SeqCst);
    info!(scheduler = %name, ticks, "Stopped");
}

impl<D: Dispatch> Drop for RecurringScheduler<D> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
