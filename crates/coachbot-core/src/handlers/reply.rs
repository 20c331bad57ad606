//! Free text and unrecognized actions.

use std::sync::Arc;

use coachbot_types::event::EventKind;
use tracing::debug;

use crate::conversation::ConversationError;
use crate::middleware::HandlerResult;
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Hand free text to the chat's open conversation, or point at the menu.
pub async fn forward_reply<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let chat_id = session.chat_id();
    let EventKind::Text { text } = session.event.kind else {
        return Ok(());
    };

    match services.conversations.answer(chat_id, text).await {
        Ok(()) => Ok(()),
        Err(err @ (ConversationError::NotFound(_) | ConversationError::Closed)) => {
            debug!(chat_id, error = %err, "no conversation to answer");
            services
                .say(chat_id, &services.messages().no_conversation)
                .await?;
            Ok(())
        }
    }
}

pub async fn unknown_action<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    debug!(
        chat_id = session.chat_id(),
        token = session.token.as_deref(),
        "unknown action"
    );
    services
        .say(session.chat_id(), &services.messages().unknown_action)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{services, text_session};

    #[tokio::test]
    async fn reply_reaches_waiting_conversation() {
        let services = services();
        let conversation = services.conversations.create(42);

        forward_reply(Arc::clone(&services), text_session(42, 1, "Squat Day"))
            .await
            .unwrap();

        assert_eq!(conversation.wait_answer().await.unwrap(), "Squat Day");
        assert!(services.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn reply_without_conversation_gets_hint() {
        let services = services();
        forward_reply(Arc::clone(&services), text_session(42, 1, "hello"))
            .await
            .unwrap();
        assert_eq!(
            services.sender.texts(),
            vec![services.messages().no_conversation.clone()]
        );
    }
}
