//! Console sender: renders outbound messages to stdout.
//!
//! Stands in for a chat platform adapter during local runs. Each message is
//! printed with its chat id and message id; keyboards are rendered as one
//! line per row with the callback token next to every button.

use std::io::Write;
use std::sync::atomic::{AtomicI64, Ordering};

use coachbot_core::sender::Sender;
use coachbot_types::error::SendError;
use coachbot_types::event::{Keyboard, MessageId};
use console::style;

/// Prints outbound messages instead of delivering them.
#[derive(Debug)]
pub struct ConsoleSender {
    next_id: AtomicI64,
}

impl ConsoleSender {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
        }
    }

    fn render(chat_id: i64, message_id: MessageId, text: &str, keyboard: Option<&Keyboard>) -> String {
        let mut out = format!(
            "{} {}\n",
            style(format!("[chat {chat_id} #{message_id}]")).cyan().bold(),
            text
        );
        for row in keyboard.map(|k| k.rows.as_slice()).unwrap_or_default() {
            let buttons: Vec<String> = row
                .iter()
                .map(|b| format!("[{}] {}", b.text, style(format!("cb:{}", b.data)).dim()))
                .collect();
            out.push_str("    ");
            out.push_str(&buttons.join("  "));
            out.push('\n');
        }
        out
    }

    fn write(line: &str) -> Result<(), SendError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(line.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| SendError::Transport(e.to_string()))
    }
}

impl Default for ConsoleSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for ConsoleSender {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, SendError> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Self::write(&Self::render(chat_id, message_id, text, keyboard))?;
        Ok(message_id)
    }

    async fn delete(&self, chat_id: i64, message_id: MessageId) -> Result<(), SendError> {
        Self::write(&format!(
            "{}\n",
            style(format!("[chat {chat_id} #{message_id} deleted]")).dim()
        ))
    }

    async fn answer_inbound_event(&self, event_id: &str) -> bool {
        tracing::trace!(event_id, "acknowledged callback");
        true
    }
}
