//! Shutdown orchestrator.
//!
//! Long-lived subsystems register named, prioritized callbacks. When the
//! process-wide cancellation token fires, the coordinator moves from
//! *accepting* to *draining*, runs the callbacks one at a time in ascending
//! priority under an overall deadline, and ends in *done*. A callback that
//! fails or panics is logged and the next one still runs.
//!
//! Every registration bumps a countdown that the main path waits on via
//! [`ShutdownCoordinator::wait`]; each callback decrements it once, whether
//! it succeeded, failed or was abandoned at the deadline.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::panics;

type ShutdownAction = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Errors from the shutdown coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShutdownError {
    #[error("shutdown already started, cannot register '{0}'")]
    Draining(String),
}

/// Lifecycle of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Accepting,
    Draining,
    Done,
}

struct ShutdownCallback {
    name: String,
    priority: i32,
    action: ShutdownAction,
}

/// What happened during a drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Callbacks that ran, in execution order.
    pub executed: Vec<String>,
    /// Subset of `executed` that returned an error or panicked.
    pub failed: Vec<String>,
    /// Callbacks that did not run (or did not finish) before the deadline.
    pub abandoned: Vec<String>,
}

/// Counter plus block-until-zero.
#[derive(Default)]
struct Countdown {
    count: AtomicUsize,
    notify: Notify,
}

impl Countdown {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn done(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }

    async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Collects shutdown callbacks and drains them in priority order.
pub struct ShutdownCoordinator {
    state: Mutex<ShutdownState>,
    callbacks: Mutex<Vec<ShutdownCallback>>,
    pending: Countdown,
    /// Set once draining has finished.
    drained: CancellationToken,
    deadline: Duration,
}

impl ShutdownCoordinator {
    pub fn new(deadline: Duration) -> Self {
        Self {
            state: Mutex::new(ShutdownState::Accepting),
            callbacks: Mutex::new(Vec::new()),
            pending: Countdown::default(),
            drained: CancellationToken::new(),
            deadline,
        }
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a callback. Lower priorities run first.
    pub fn add_callback<F, Fut>(
        &self,
        name: impl Into<String>,
        priority: i32,
        action: F,
    ) -> Result<(), ShutdownError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != ShutdownState::Accepting {
            return Err(ShutdownError::Draining(name));
        }

        debug!(%name, priority, "registered shutdown callback");
        self.pending.add();
        self.callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ShutdownCallback {
                name,
                priority,
                action: Box::new(move || Box::pin(action())),
            });
        Ok(())
    }

    /// Number of callbacks not yet drained.
    pub fn pending(&self) -> usize {
        self.pending.count.load(Ordering::SeqCst)
    }

    /// Run every registered callback once, in ascending priority.
    ///
    /// Only the first call drains; later calls return an empty report.
    pub async fn drain(&self) -> DrainReport {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != ShutdownState::Accepting {
                return DrainReport::default();
            }
            *state = ShutdownState::Draining;
        }

        let mut callbacks =
            std::mem::take(&mut *self.callbacks.lock().unwrap_or_else(|e| e.into_inner()));
        // Stable sort: equal priorities keep registration order
        callbacks.sort_by_key(|cb| cb.priority);
        info!(count = callbacks.len(), "draining shutdown callbacks");

        let mut report = DrainReport::default();
        let mut queue = callbacks.into_iter();
        let mut in_flight: Option<String> = None;

        let drained_in_time = tokio::time::timeout(self.deadline, async {
            for callback in queue.by_ref() {
                debug!(name = %callback.name, priority = callback.priority, "running shutdown callback");
                in_flight = Some(callback.name.clone());
                let result = panics::catch((callback.action)()).await;
                let name = callback.name;
                in_flight = None;
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        error!(%name, error = %err, "shutdown callback failed");
                        report.failed.push(name.clone());
                    }
                    Err(panic) => {
                        error!(
                            %name,
                            panic = panic.message(),
                            trace = panic.trace(),
                            "shutdown callback panicked"
                        );
                        report.failed.push(name.clone());
                    }
                }
                report.executed.push(name);
                self.pending.done();
            }
        })
        .await
        .is_ok();

        if !drained_in_time {
            let cut_off = in_flight.take().into_iter();
            for name in cut_off.chain(queue.map(|cb| cb.name)) {
                report.abandoned.push(name);
                self.pending.done();
            }
            warn!(
                deadline = ?self.deadline,
                abandoned = ?report.abandoned,
                "shutdown deadline exceeded"
            );
        }

        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ShutdownState::Done;
        self.drained.cancel();
        info!(
            executed = report.executed.len(),
            failed = report.failed.len(),
            "shutdown complete"
        );
        report
    }

    /// Drain once `signal` is cancelled.
    pub fn watch(self: &Arc<Self>, signal: CancellationToken) -> JoinHandle<DrainReport> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            signal.cancelled().await;
            coordinator.drain().await
        })
    }

    /// Block until every registered callback has been accounted for.
    pub async fn wait(&self) {
        self.pending.wait().await;
        self.drained.cancelled().await;
    }
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .field("deadline", &self.deadline)
            .finish()
    }
}
