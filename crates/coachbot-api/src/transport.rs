//! Line-oriented console transport.
//!
//! Reads one event per line from an async reader:
//!
//! ```text
//! <chat_id> <user_id> /start
//! <chat_id> <user_id> cb:prg_rename?pid=7
//! <chat_id> <user_id> Squat Day
//! ```
//!
//! Each event is dispatched on its own task so a handler parked on a
//! conversation does not block the reader.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use coachbot_core::Dispatcher;
use coachbot_core::repository::Repositories;
use coachbot_core::sender::Sender;
use coachbot_types::event::{EventKind, InboundEvent};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const CALLBACK_PREFIX: &str = "cb:";
const COMMAND_PREFIX: char = '/';

/// Why an input line could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("invalid {field} '{value}'")]
    InvalidId { field: &'static str, value: String },

    #[error("missing payload")]
    MissingPayload,
}

/// Parse one input line into an event. Returns `None` for blank lines.
pub fn parse_line(line: &str, event_id: &str) -> Result<Option<InboundEvent>, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut parts = line.splitn(3, char::is_whitespace);
    let chat_id = parse_id(parts.next(), "chat_id")?;
    let user_id = parse_id(parts.next(), "user_id")?;
    let payload = parts.next().map(str::trim).unwrap_or_default();
    if payload.is_empty() {
        return Err(LineError::MissingPayload);
    }

    let kind = if let Some(token) = payload.strip_prefix(CALLBACK_PREFIX) {
        EventKind::Callback {
            data: token.to_string(),
        }
    } else if let Some(command) = payload.strip_prefix(COMMAND_PREFIX) {
        let (name, args) = command.split_once(' ').unwrap_or((command, ""));
        EventKind::Command {
            name: name.to_string(),
            args: args.trim().to_string(),
        }
    } else {
        EventKind::Text {
            text: payload.to_string(),
        }
    };

    Ok(Some(InboundEvent {
        id: event_id.to_string(),
        chat_id,
        user_id,
        username: None,
        kind,
    }))
}

fn parse_id(part: Option<&str>, field: &'static str) -> Result<i64, LineError> {
    let part = part.ok_or(LineError::Missing(field))?;
    part.parse().map_err(|_| LineError::InvalidId {
        field,
        value: part.to_string(),
    })
}

/// Handle used by the shutdown callback to stop the reader.
#[derive(Clone)]
pub struct TransportHandle {
    stop: CancellationToken,
    stopped: CancellationToken,
}

impl TransportHandle {
    /// Stop accepting input and wait for the reader loop to exit.
    pub async fn stop(&self) {
        self.stop.cancel();
        self.stopped.cancelled().await;
    }
}

pub struct ConsoleTransport<R: Repositories, S: Sender> {
    dispatcher: Arc<Dispatcher<R, S>>,
    stop: CancellationToken,
    stopped: CancellationToken,
    sequence: AtomicU64,
}

impl<R: Repositories, S: Sender> ConsoleTransport<R, S> {
    pub fn new(dispatcher: Arc<Dispatcher<R, S>>) -> Self {
        Self {
            dispatcher,
            stop: CancellationToken::new(),
            stopped: CancellationToken::new(),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn handle(&self) -> TransportHandle {
        TransportHandle {
            stop: self.stop.clone(),
            stopped: self.stopped.clone(),
        }
    }

    /// Read and dispatch events until EOF or until stopped.
    pub async fn run<I: AsyncBufRead + Unpin>(self, input: I) -> std::io::Result<()> {
        let _stopped = self.stopped.clone().drop_guard();
        let mut lines = input.lines();
        info!("console transport started");

        loop {
            let line = tokio::select! {
                _ = self.stop.cancelled() => {
                    info!("console transport stopped");
                    return Ok(());
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                info!("console input closed");
                return Ok(());
            };

            let event_id = format!("con-{}", self.sequence.fetch_add(1, Ordering::SeqCst));
            match parse_line(&line, &event_id) {
                Ok(Some(event)) => {
                    debug!(%event_id, kind = event.kind_label(), "received event");
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move { dispatcher.dispatch(event).await });
                }
                Ok(None) => {}
                Err(err) => warn!(%line, error = %err, "ignoring malformed input line"),
            }
        }
    }
}
