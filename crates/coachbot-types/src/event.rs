//! Inbound chat events and outbound keyboard layouts.
//!
//! These are transport-neutral: the chat platform adapter maps its own
//! update format onto [`InboundEvent`] and renders [`Keyboard`] back.

use serde::{Deserialize, Serialize};

/// Identifier of a delivered outbound message.
pub type MessageId = i64;

/// An event received from the chat platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Platform id of the event, used to acknowledge callbacks.
    pub id: String,
    pub chat_id: i64,
    pub user_id: i64,
    /// Display name of the sender, if the platform provides one.
    pub username: Option<String>,
    pub kind: EventKind,
}

impl InboundEvent {
    /// Key used by the session lock table: `"chatId:userId"`.
    pub fn lock_key(&self) -> String {
        format!("{}:{}", self.chat_id, self.user_id)
    }

    /// Callback token if this is a callback event.
    pub fn callback_data(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Callback { data } => Some(data),
            _ => None,
        }
    }

    /// Short label for logging.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            EventKind::Command { .. } => "command",
            EventKind::Callback { .. } => "callback",
            EventKind::Text { .. } => "text",
        }
    }
}

/// The three shapes an inbound event can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A system command such as `/start`, without the leading slash.
    Command { name: String, args: String },
    /// A button press carrying a reference token.
    Callback { data: String },
    /// A free-text message.
    Text { text: String },
}

/// A clickable button under an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    /// Reference token sent back as callback data.
    pub data: String,
}

impl Button {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard: rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons.
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    /// Append a single-button row.
    pub fn button(self, text: impl Into<String>, data: impl Into<String>) -> Self {
        self.row(vec![Button::new(text, data)])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
