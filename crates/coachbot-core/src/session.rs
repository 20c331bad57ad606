//! Per-event session context.
//!
//! A `Session` is created by the dispatcher for every inbound event, moved
//! through the interceptor chain (each interceptor may fill in fields) and
//! dropped when the chain completes. It is never persisted.

use coachbot_types::event::InboundEvent;
use coachbot_types::program::{Exercise, Program, Record, SubProgram};
use coachbot_types::user::User;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::params::Params;

/// Context threaded through the interceptor chain for one inbound event.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique id for log correlation.
    pub id: Uuid,
    pub event: InboundEvent,
    /// Sender of the event, resolved by the identity interceptor.
    pub user: Option<User>,
    /// Raw reference token for callback events.
    pub token: Option<String>,
    /// Decoded token fields, set by the parameter interceptor.
    pub params: Params,
    pub program: Option<Program>,
    pub sub_program: Option<SubProgram>,
    pub exercise: Option<Exercise>,
    pub record: Option<Record>,
    /// User referenced by the token (`uid`), as opposed to the sender.
    pub target_user: Option<User>,
    /// Pagination window; `None` lets the handler pick its default.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Child of the process-wide shutdown token.
    pub cancellation: CancellationToken,
}

impl Session {
    pub fn new(event: InboundEvent, cancellation: CancellationToken) -> Self {
        let token = event.callback_data().map(str::to_string);
        Self {
            id: Uuid::now_v7(),
            event,
            user: None,
            token,
            params: Params::default(),
            program: None,
            sub_program: None,
            exercise: None,
            record: None,
            target_user: None,
            limit: None,
            offset: None,
            cancellation,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.event.chat_id
    }

    pub fn user_id(&self) -> i64 {
        self.event.user_id
    }

    /// Lock table key: `"chatId:userId"`.
    pub fn lock_key(&self) -> String {
        self.event.lock_key()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachbot_types::event::EventKind;

    fn event(kind: EventKind) -> InboundEvent {
        InboundEvent {
            id: "ev-1".to_string(),
            chat_id: 42,
            user_id: 7,
            username: Some("alice".to_string()),
            kind,
        }
    }

    #[test]
    fn new_session_copies_callback_token() {
        let session = Session::new(
            event(EventKind::Callback {
                data: "prg_rename?pid=7".to_string(),
            }),
            CancellationToken::new(),
        );
        assert_eq!(session.token.as_deref(), Some("prg_rename?pid=7"));
        assert!(session.params.is_empty());
        assert_eq!(session.lock_key(), "42:7");
    }

    #[test]
    fn text_session_has_no_token() {
        let session = Session::new(
            event(EventKind::Text {
                text: "hello".to_string(),
            }),
            CancellationToken::new(),
        );
        assert!(session.token.is_none());
        assert!(session.limit.is_none());
    }

    #[test]
    fn session_follows_parent_cancellation() {
        let root = CancellationToken::new();
        let session = Session::new(
            event(EventKind::Text {
                text: "hello".to_string(),
            }),
            root.child_token(),
        );
        assert!(!session.is_cancelled());
        root.cancel();
        assert!(session.is_cancelled());
    }
}
