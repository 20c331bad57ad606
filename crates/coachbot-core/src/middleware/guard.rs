//! Per-session concurrency guard.

use std::sync::Arc;

use tracing::debug;

use super::{Handler, Interceptor, handler_fn, interceptor_fn};
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;

/// Allow one chain at a time per `chat:user` key.
///
/// When the key is already held, an event for a chat with an open
/// conversation proceeds unguarded (it is the reply the parked handler is
/// waiting for). Any other overlapping event is dropped without a reply.
pub fn guard<R: Repositories, S: Sender>(services: Arc<Services<R, S>>) -> Interceptor {
    interceptor_fn(move |next: Handler| {
        let services = Arc::clone(&services);
        handler_fn(move |session| {
            let services = Arc::clone(&services);
            let next = Arc::clone(&next);
            async move {
                let key = session.lock_key();
                if let Some(lock) = services.locks.try_lock(&key) {
                    let result = next(session).await;
                    lock.unlock();
                    return result;
                }

                if services.conversations.exists(session.chat_id()) {
                    debug!(%key, "session busy, forwarding to open conversation");
                    return next(session).await;
                }

                debug!(%key, kind = session.event.kind_label(), "session busy, dropping event");
                Ok(())
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Notify;

    use crate::middleware::Chain;
    use crate::testing::{callback_session, services, text_session};

    /// Terminal that counts entries and parks until released.
    fn parking_terminal(entered: Arc<AtomicUsize>, release: Arc<Notify>) -> Handler {
        handler_fn(move |_| {
            let entered = Arc::clone(&entered);
            let release = Arc::clone(&release);
            async move {
                entered.fetch_add(1, Ordering::SeqCst);
                release.notified().await;
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn overlapping_event_is_dropped() {
        let services = services();
        let entered = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());
        let handler = Chain::new("guard")
            .with(guard(Arc::clone(&services)))
            .then(parking_terminal(Arc::clone(&entered), Arc::clone(&release)));

        let first = tokio::spawn(handler(callback_session(42, 1, "prg_list")));
        while !services.locks.is_locked("42:1") {
            tokio::task::yield_now().await;
        }

        // Second event returns immediately without entering the handler
        handler(callback_session(42, 1, "prg_list")).await.unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 1);

        release.notify_one();
        first.await.unwrap().unwrap();
        assert!(!services.locks.is_locked("42:1"));
        assert!(services.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn open_conversation_bypasses_lock() {
        let services = services();
        let entered = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());
        let handler = Chain::new("guard")
            .with(guard(Arc::clone(&services)))
            .then(parking_terminal(Arc::clone(&entered), Arc::clone(&release)));

        let _held = services.locks.try_lock("42:1").unwrap();
        services.conversations.create(42);

        let reply = tokio::spawn(handler(text_session(42, 1, "Squat Day")));
        while entered.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        release.notify_one();
        tokio::time::timeout(Duration::from_secs(1), reply)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_users_do_not_contend() {
        let services = services();
        let entered = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());
        let handler = Chain::new("guard")
            .with(guard(Arc::clone(&services)))
            .then(parking_terminal(Arc::clone(&entered), Arc::clone(&release)));

        let a = tokio::spawn(handler(callback_session(42, 1, "prg_list")));
        let b = tokio::spawn(handler(callback_session(42, 2, "prg_list")));
        while entered.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        release.notify_waiters();
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
    }
}
