//! Outbound message sender trait.
//!
//! Implementations live in coachbot-infra (or in a chat platform adapter).

use coachbot_types::error::SendError;
use coachbot_types::event::{Keyboard, MessageId};

/// Delivers messages to chats and acknowledges inbound events.
pub trait Sender: Send + Sync + 'static {
    /// Send `text` to a chat, optionally with an inline keyboard.
    fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl std::future::Future<Output = Result<MessageId, SendError>> + Send;

    /// Delete a previously sent message.
    fn delete(
        &self,
        chat_id: i64,
        message_id: MessageId,
    ) -> impl std::future::Future<Output = Result<(), SendError>> + Send;

    /// Acknowledge an inbound callback so the client stops its spinner.
    ///
    /// Returns `false` if the platform rejected the acknowledgement.
    fn answer_inbound_event(
        &self,
        event_id: &str,
    ) -> impl std::future::Future<Output = bool> + Send;
}
