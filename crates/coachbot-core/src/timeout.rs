//! Timeout supervisor: races a handler against a deadline.
//!
//! The supervised future runs on its own tokio task. When the deadline
//! passes first, the supervisor stops waiting and the task is detached: it
//! may still finish later and its effects are neither awaited nor rolled
//! back. A panic inside the task is caught on the task's own thread and
//! re-raised in the caller as a [`CaughtPanic`](panics::CaughtPanic), so the outer
//! panic-containment interceptor sees it together with its trace.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::panics;

/// Minimum handler deadline accepted from configuration.
pub const MIN_DEADLINE: Duration = Duration::from_secs(1);

/// How a supervised run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The future completed before the deadline.
    Completed(T),
    /// The deadline passed first; the task keeps running detached.
    TimedOut,
    /// The task was cancelled by the runtime (e.g. runtime shutdown).
    Aborted,
}

/// Races spawned futures against a fixed deadline.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutSupervisor {
    deadline: Duration,
}

impl TimeoutSupervisor {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Build from the configured number of seconds, enforcing [`MIN_DEADLINE`].
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs).max(MIN_DEADLINE))
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `fut` on a separate task and wait at most the deadline for it.
    pub async fn run<F, T>(&self, fut: F) -> Outcome<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut handle = tokio::spawn(panics::catch(fut));

        tokio::select! {
            joined = &mut handle => match joined {
                Ok(Ok(value)) => Outcome::Completed(value),
                Ok(Err(panic)) => panic.resume(),
                Err(err) => {
                    warn!(error = %err, "supervised task was cancelled");
                    Outcome::Aborted
                }
            },
            _ = tokio::time::sleep(self.deadline) => Outcome::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panics::CaughtPanic;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn completes_before_deadline() {
        let supervisor = TimeoutSupervisor::new(Duration::from_secs(5));
        let outcome = supervisor.run(async { 7 }).await;
        assert_eq!(outcome, Outcome::Completed(7));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_and_detaches_task() {
        let supervisor = TimeoutSupervisor::new(Duration::from_secs(1));
        let finished = Arc::new(AtomicBool::new(false));

        let outcome = supervisor
            .run({
                let finished = Arc::clone(&finished);
                async move {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    finished.store(true, Ordering::SeqCst);
                }
            })
            .await;
        assert_eq!(outcome, Outcome::TimedOut);
        assert!(!finished.load(Ordering::SeqCst));

        // The abandoned task is allowed to run to completion
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn panic_is_reraised_in_caller() {
        let supervisor = TimeoutSupervisor::new(Duration::from_secs(5));
        let caller = tokio::spawn(async move {
            supervisor
                .run::<_, ()>(async { panic!("boom") })
                .await
        });
        let err = caller.await.unwrap_err();
        let payload = err.into_panic();
        let caught = payload.downcast_ref::<CaughtPanic>().unwrap();
        assert_eq!(caught.message(), "boom");
        assert!(caught.trace().contains("boom"));
    }

    #[test]
    fn from_secs_enforces_floor() {
        assert_eq!(TimeoutSupervisor::from_secs(0).deadline(), MIN_DEADLINE);
        assert_eq!(
            TimeoutSupervisor::from_secs(30).deadline(),
            Duration::from_secs(30)
        );
    }
}
