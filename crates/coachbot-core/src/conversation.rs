//! Conversation engine: lets a handler block until the chat's next reply.
//!
//! A handler that needs free-text input creates a [`Conversation`] for its
//! chat, sends a prompt, and awaits [`Conversation::wait_answer`]. The text
//! dispatcher delivers the next message from the same chat through
//! [`ConversationRegistry::answer`]. The rest of the process keeps serving
//! other chats while the handler is parked.
//!
//! At most one conversation is live per chat. Creating a new one closes the
//! previous one, and a closed conversation wakes its waiter with
//! [`ConversationError::Closed`]. Superseded, timed-out, cancelled and
//! shut-down conversations all surface the same way.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors returned by conversation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// The conversation was closed before an answer arrived.
    #[error("conversation closed")]
    Closed,

    /// No conversation is open for the chat.
    #[error("no conversation open for chat {0}")]
    NotFound(i64),
}

/// A single-waiter dialog channel owned by one chat.
pub struct Conversation {
    chat_id: i64,
    tx: mpsc::Sender<String>,
    /// Held for the whole wait so only one caller receives each answer.
    rx: Mutex<mpsc::Receiver<String>>,
    closed: CancellationToken,
}

impl Conversation {
    fn new(chat_id: i64) -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            chat_id,
            tx,
            rx: Mutex::new(rx),
            closed: CancellationToken::new(),
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Block until the next answer arrives or the conversation is closed.
    pub async fn wait_answer(&self) -> Result<String, ConversationError> {
        let mut rx = tokio::select! {
            biased;
            _ = self.closed.cancelled() => return Err(ConversationError::Closed),
            rx = self.rx.lock() => rx,
        };

        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(ConversationError::Closed),
            answer = rx.recv() => answer.ok_or(ConversationError::Closed),
        }
    }

    /// Hand `text` to the waiter.
    ///
    /// Waits for the single slot to free up if a previous answer has not been
    /// taken yet. Fails instead of blocking once the conversation is closed.
    pub async fn answer(&self, text: String) -> Result<(), ConversationError> {
        if self.is_closed() {
            return Err(ConversationError::Closed);
        }

        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(ConversationError::Closed),
            sent = self.tx.send(text) => sent.map_err(|_| ConversationError::Closed),
        }
    }

    /// Close the conversation, waking any waiter. Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("chat_id", &self.chat_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Table of live conversations keyed by chat id.
///
/// Calls for different chats are safe concurrently. Calls for the same chat
/// are serialized upstream by the session lock table.
#[derive(Default)]
pub struct ConversationRegistry {
    conversations: DashMap<i64, Arc<Conversation>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh conversation for `chat_id`, closing any previous one.
    pub fn create(&self, chat_id: i64) -> Arc<Conversation> {
        let conversation = Arc::new(Conversation::new(chat_id));
        if let Some(previous) = self.conversations.insert(chat_id, Arc::clone(&conversation)) {
            previous.close();
            debug!(chat_id, "superseded open conversation");
        }
        conversation
    }

    pub fn get(&self, chat_id: i64) -> Option<Arc<Conversation>> {
        self.conversations
            .get(&chat_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn exists(&self, chat_id: i64) -> bool {
        self.conversations.contains_key(&chat_id)
    }

    /// Deliver a reply to the chat's open conversation.
    pub async fn answer(&self, chat_id: i64, text: String) -> Result<(), ConversationError> {
        let conversation = self
            .get(chat_id)
            .ok_or(ConversationError::NotFound(chat_id))?;
        conversation.answer(text).await
    }

    /// Close and remove the chat's conversation, if any. Idempotent.
    ///
    /// Returns `true` if a conversation was open.
    pub fn delete(&self, chat_id: i64) -> bool {
        match self.conversations.remove(&chat_id) {
            Some((_, conversation)) => {
                conversation.close();
                debug!(chat_id, "closed conversation");
                true
            }
            None => false,
        }
    }

    /// Close `conversation` and remove it only if it is still the chat's
    /// current one, so a handler finishing late cannot evict its successor.
    pub fn finish(&self, conversation: &Arc<Conversation>) {
        conversation.close();
        self.conversations
            .remove_if(&conversation.chat_id, |_, current| {
                Arc::ptr_eq(current, conversation)
            });
    }

    /// Close every live conversation and clear the table.
    pub fn shutdown(&self) {
        let count = self.conversations.len();
        for entry in self.conversations.iter() {
            entry.value().close();
        }
        self.conversations.clear();
        debug!(count, "closed all conversations");
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

impl std::fmt::Debug for ConversationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationRegistry")
            .field("open", &self.conversations.len())
            .finish()
    }
}
