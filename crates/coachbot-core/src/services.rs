//! Shared collaborators handed to every interceptor and handler.

use std::sync::Arc;

use coachbot_types::config::{BotConfig, Messages};
use coachbot_types::error::SendError;
use coachbot_types::event::{Keyboard, MessageId};

use crate::conversation::ConversationRegistry;
use crate::lock::SessionLocks;
use crate::repository::Repositories;
use crate::sender::Sender;

/// Process-wide state used by the pipeline.
///
/// Generic over the repository bundle and the sender so that coachbot-core
/// never depends on coachbot-infra. The lock and conversation tables are
/// `Arc`-shared so shutdown callbacks can hold them independently.
pub struct Services<R: Repositories, S: Sender> {
    pub repos: R,
    pub sender: S,
    pub conversations: Arc<ConversationRegistry>,
    pub locks: Arc<SessionLocks>,
    pub config: Arc<BotConfig>,
}

impl<R: Repositories, S: Sender> Services<R, S> {
    /// Wire services with fresh, empty lock and conversation tables.
    pub fn new(repos: R, sender: S, config: BotConfig) -> Self {
        Self {
            repos,
            sender,
            conversations: Arc::new(ConversationRegistry::new()),
            locks: Arc::new(SessionLocks::new()),
            config: Arc::new(config),
        }
    }

    pub fn messages(&self) -> &Messages {
        &self.config.messages
    }

    /// Send plain text to a chat.
    pub async fn say(&self, chat_id: i64, text: &str) -> Result<MessageId, SendError> {
        self.sender.send(chat_id, text, None).await
    }

    /// Send text with an inline keyboard; an empty keyboard is omitted.
    pub async fn say_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, SendError> {
        let keyboard = (!keyboard.is_empty()).then_some(keyboard);
        self.sender.send(chat_id, text, keyboard).await
    }
}

impl<R: Repositories, S: Sender> std::fmt::Debug for Services<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("conversations", &self.conversations)
            .field("locks", &self.locks)
            .finish()
    }
}
