//! Panic containment at the chain boundary.
//!
//! The outermost interceptor of every chain. It turns both handler errors
//! and panics into a log entry plus, unless the session is already
//! cancelled, the generic error message. Nothing escapes it.

use std::sync::Arc;

use tracing::error;

use super::{Handler, Interceptor, handler_fn, interceptor_fn};
use crate::panics;
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;

/// Longest prefix of `trace` that fits in `limit` bytes.
fn truncate_trace(trace: &str, limit: usize) -> &str {
    if trace.len() <= limit {
        return trace;
    }
    let mut end = limit;
    while !trace.is_char_boundary(end) {
        end -= 1;
    }
    &trace[..end]
}

/// Contain errors and panics from the rest of the chain.
pub fn recover<R: Repositories, S: Sender>(services: Arc<Services<R, S>>) -> Interceptor {
    panics::install_hook();
    interceptor_fn(move |next: Handler| {
        let services = Arc::clone(&services);
        handler_fn(move |session| {
            let services = Arc::clone(&services);
            let next = Arc::clone(&next);
            async move {
                let chat_id = session.chat_id();
                let session_id = session.id;
                let cancellation = session.cancellation.clone();

                match panics::catch(next(session)).await {
                    Ok(Ok(())) => return Ok(()),
                    Ok(Err(err)) => {
                        error!(chat_id, %session_id, error = %err, "handler failed");
                    }
                    Err(panic) => {
                        let trace = truncate_trace(panic.trace(), services.config.stack_trace_limit);
                        error!(
                            chat_id,
                            %session_id,
                            panic = panic.message(),
                            trace,
                            "handler panicked"
                        );
                    }
                }

                if cancellation.is_cancelled() {
                    return Ok(());
                }
                if let Err(err) = services
                    .say(chat_id, &services.messages().generic_error)
                    .await
                {
                    error!(chat_id, error = %err, "failed to report handler failure");
                }
                Ok(())
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use coachbot_types::error::RepositoryError;
    use tokio_util::sync::CancellationToken;

    use crate::middleware::{Chain, HandlerError};
    use crate::session::Session;
    use crate::testing::{callback_event, callback_session, services};

    #[test]
    fn truncate_keeps_short_traces() {
        assert_eq!(truncate_trace("abc", 10), "abc");
        assert_eq!(truncate_trace("abcdef", 3), "abc");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(truncate_trace("aé", 2), "a");
        assert_eq!(truncate_trace("aé", 3), "aé");
    }

    #[tokio::test]
    async fn panic_is_contained_and_reported() {
        let services = services();
        let handler = Chain::new("recover")
            .with(recover(Arc::clone(&services)))
            .then(handler_fn(|_| async { panic!("handler exploded") }));

        handler(callback_session(42, 1, "prg_list")).await.unwrap();
        assert_eq!(
            services.sender.texts(),
            vec![services.messages().generic_error.clone()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panic_from_supervised_task_is_contained() {
        let services = services();
        let handler = Chain::new("recover")
            .with(recover(Arc::clone(&services)))
            .with(crate::middleware::timeout(Arc::clone(&services)))
            .then(handler_fn(|_| async { panic!("inside supervised task") }));

        handler(callback_session(42, 1, "prg_list")).await.unwrap();
        assert_eq!(
            services.sender.texts(),
            vec![services.messages().generic_error.clone()]
        );
    }

    #[tokio::test]
    async fn infrastructure_error_is_contained() {
        let services = services();
        let handler = Chain::new("recover")
            .with(recover(Arc::clone(&services)))
            .then(handler_fn(|_| async {
                Err(HandlerError::from(RepositoryError::Connection(
                    "refused".to_string(),
                )))
            }));

        handler(callback_session(42, 1, "prg_list")).await.unwrap();
        assert_eq!(services.sender.sent_to(42).len(), 1);
    }

    #[tokio::test]
    async fn cancelled_session_is_not_messaged() {
        let services = services();
        let handler = Chain::new("recover")
            .with(recover(Arc::clone(&services)))
            .then(handler_fn(|_| async { panic!("during shutdown") }));

        let root = CancellationToken::new();
        let session = Session::new(callback_event(42, 1, "prg_list"), root.child_token());
        root.cancel();

        handler(session).await.unwrap();
        assert!(services.sender.sent().is_empty());
    }
}
