//! Panic capture with backtraces.
//!
//! A process-wide hook records the panic location, message and a backtrace
//! into a slot local to the panicking thread. [`catch`] stops the unwind and
//! takes that slot in the same poll, so a recorded trace always belongs to
//! the panic being caught. A panic that has to cross a task boundary is
//! re-raised as a [`CaughtPanic`] and keeps the trace it was caught with.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Once;

use futures_util::FutureExt;

static INSTALL_HOOK: Once = Once::new();

thread_local! {
    static THREAD_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Chain a hook that records a trace for every panic. Idempotent.
pub fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let trace = format!("{info}\n{}", Backtrace::force_capture());
            THREAD_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

fn take_thread_trace() -> String {
    THREAD_TRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| Backtrace::force_capture().to_string())
}

/// Message carried by a panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else if let Some(caught) = payload.downcast_ref::<CaughtPanic>() {
        caught.message()
    } else {
        "non-string panic payload"
    }
}

/// A panic stopped by [`catch`], with the trace recorded where it was raised.
pub struct CaughtPanic {
    payload: Box<dyn Any + Send>,
    trace: String,
}

impl CaughtPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        // Re-raised from another task: the trace is already attached
        match payload.downcast::<CaughtPanic>() {
            Ok(caught) => *caught,
            Err(payload) => Self {
                payload,
                trace: take_thread_trace(),
            },
        }
    }

    pub fn message(&self) -> &str {
        payload_message(self.payload.as_ref())
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    /// Continue unwinding with this panic. The trace travels with it.
    pub fn resume(self) -> ! {
        std::panic::resume_unwind(Box::new(self))
    }
}

impl std::fmt::Debug for CaughtPanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaughtPanic")
            .field("message", &self.message())
            .finish_non_exhaustive()
    }
}

/// Poll `fut` to completion, turning a panic into [`CaughtPanic`].
pub async fn catch<F: Future>(fut: F) -> Result<F::Output, CaughtPanic> {
    install_hook();
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(CaughtPanic::from_payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exploding(message: &'static str) {
        panic!("{message}");
    }

    fn stale_panic() {
        panic!("stale panic");
    }

    async fn rethrow(caught: CaughtPanic) {
        caught.resume()
    }

    #[test]
    fn payload_message_handles_every_payload_kind() {
        let static_payload: Box<dyn Any + Send> = Box::new("static");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(payload_message(static_payload.as_ref()), "static");
        assert_eq!(payload_message(owned_payload.as_ref()), "owned");
        assert_eq!(payload_message(other_payload.as_ref()), "non-string panic payload");
    }

    #[tokio::test]
    async fn catch_records_message_and_trace() {
        let caught = catch(exploding("handler exploded")).await.unwrap_err();
        assert_eq!(caught.message(), "handler exploded");
        assert!(caught.trace().contains("handler exploded"));
    }

    #[tokio::test]
    async fn value_passes_through() {
        assert_eq!(catch(async { 5 }).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn trace_travels_with_a_panic_from_another_thread() {
        install_hook();
        // Leave an unconsumed record on this thread
        assert!(std::panic::catch_unwind(stale_panic).is_err());

        let from_worker = tokio::task::spawn_blocking(|| {
            catch(exploding("worker panic"))
                .now_or_never()
                .and_then(Result::err)
        })
        .await
        .unwrap()
        .unwrap();

        let caught = catch(rethrow(from_worker)).await.unwrap_err();
        assert_eq!(caught.message(), "worker panic");
        assert!(caught.trace().contains("worker panic"));
        assert!(!caught.trace().contains("stale panic"));
    }
}
