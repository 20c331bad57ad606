//! Handler deadline.

use std::sync::Arc;

use tracing::warn;

use super::{Handler, Interceptor, handler_fn, interceptor_fn};
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;
use crate::timeout::{Outcome, TimeoutSupervisor};

/// Bound everything downstream by `handler_timeout_secs`.
///
/// On expiry the chat's open conversation is closed so the parked handler
/// wakes up and exits, and the user gets the timeout message. The
/// downstream task is not awaited any further.
pub fn timeout<R: Repositories, S: Sender>(services: Arc<Services<R, S>>) -> Interceptor {
    let supervisor = TimeoutSupervisor::from_secs(services.config.handler_timeout_secs);
    interceptor_fn(move |next: Handler| {
        let services = Arc::clone(&services);
        handler_fn(move |session| {
            let services = Arc::clone(&services);
            let next = Arc::clone(&next);
            async move {
                let chat_id = session.chat_id();
                match supervisor.run(next(session)).await {
                    Outcome::Completed(result) => result,
                    Outcome::TimedOut => {
                        let closed = services.conversations.delete(chat_id);
                        warn!(
                            chat_id,
                            deadline = ?supervisor.deadline(),
                            closed_conversation = closed,
                            "handler timed out"
                        );
                        services
                            .say(chat_id, &services.messages().timeout)
                            .await?;
                        Ok(())
                    }
                    Outcome::Aborted => Ok(()),
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use coachbot_types::config::BotConfig;

    use crate::ConversationError;
    use crate::middleware::Chain;
    use crate::testing::{callback_session, services_with};

    fn config(secs: u64) -> BotConfig {
        BotConfig {
            handler_timeout_secs: secs,
            ..BotConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_closes_conversation_and_notifies() {
        let services = services_with(config(2));
        let observed = Arc::new(std::sync::Mutex::new(None));

        let terminal = {
            let services = Arc::clone(&services);
            let observed = Arc::clone(&observed);
            handler_fn(move |session| {
                let services = Arc::clone(&services);
                let observed = Arc::clone(&observed);
                async move {
                    let conversation = services.conversations.create(session.chat_id());
                    let answer = conversation.wait_answer().await;
                    *observed.lock().unwrap() = Some(answer);
                    Ok(())
                }
            })
        };
        let handler = Chain::new("timeout")
            .with(timeout(Arc::clone(&services)))
            .then(terminal);

        handler(callback_session(42, 1, "prg_rename?pid=7"))
            .await
            .unwrap();

        assert_eq!(services.sender.texts(), vec![services.messages().timeout.clone()]);
        assert!(!services.conversations.exists(42));

        // The abandoned waiter wakes with the cancellation value
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            *observed.lock().unwrap(),
            Some(Err(ConversationError::Closed))
        );

        // A late answer is refused instead of blowing up
        assert_eq!(
            services.conversations.answer(42, "late".to_string()).await,
            Err(ConversationError::NotFound(42))
        );
    }

    #[tokio::test]
    async fn fast_handler_is_silent() {
        let services = services_with(config(5));
        let handler = Chain::new("timeout")
            .with(timeout(Arc::clone(&services)))
            .then(handler_fn(|_| async { Ok(()) }));

        handler(callback_session(42, 1, "prg_list")).await.unwrap();
        assert!(services.sender.sent().is_empty());
    }
}
