//! Terminal business handlers.
//!
//! Each handler is a plain `async fn(Arc<Services>, Session)`. They assume
//! the interceptors in front of them have already acknowledged the event,
//! resolved the sender and loaded every entity the token references.

pub mod client;
pub mod day;
pub mod menu;
pub mod program;
pub mod record;
pub mod reply;
pub mod start;
pub mod training;

use std::future::Future;
use std::sync::Arc;

use coachbot_types::event::Button;
use tracing::debug;

use crate::conversation::{Conversation, ConversationRegistry};
use crate::middleware::{Handler, HandlerError, HandlerResult, handler_fn};
use crate::params::{self, Params};
use crate::repository::{Page, Repositories};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Adapt a handler function to the type-erased [`Handler`].
pub fn route<R, S, F, Fut>(services: &Arc<Services<R, S>>, f: F) -> Handler
where
    R: Repositories,
    S: Sender,
    F: Fn(Arc<Services<R, S>>, Session) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let services = Arc::clone(services);
    handler_fn(move |session| f(Arc::clone(&services), session))
}

/// A conversation owned by the running handler.
///
/// Dropping it closes the conversation and removes it from the registry
/// unless a newer one has replaced it.
pub struct Dialog {
    registry: Arc<ConversationRegistry>,
    conversation: Arc<Conversation>,
}

impl Dialog {
    pub fn open<R: Repositories, S: Sender>(services: &Services<R, S>, chat_id: i64) -> Self {
        Self {
            registry: Arc::clone(&services.conversations),
            conversation: services.conversations.create(chat_id),
        }
    }

    /// Send `prompt` and wait for the reply.
    ///
    /// Returns `None` once the conversation has been closed (superseded,
    /// cancelled, timed out or shut down).
    pub async fn ask<R: Repositories, S: Sender>(
        &self,
        services: &Services<R, S>,
        prompt: &str,
    ) -> Result<Option<String>, HandlerError> {
        let chat_id = self.conversation.chat_id();
        services.say(chat_id, prompt).await?;
        match self.conversation.wait_answer().await {
            Ok(answer) => Ok(Some(answer)),
            Err(err) => {
                debug!(chat_id, error = %err, "conversation ended without answer");
                Ok(None)
            }
        }
    }

    /// Like [`Dialog::ask`], re-prompting until the reply is not blank.
    pub async fn ask_name<R: Repositories, S: Sender>(
        &self,
        services: &Services<R, S>,
        prompt: &str,
    ) -> Result<Option<String>, HandlerError> {
        let mut prompt = prompt.to_string();
        loop {
            let Some(answer) = self.ask(services, &prompt).await? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(Some(answer.to_string()));
            }
            prompt = "The name cannot be empty. Send a new name.".to_string();
        }
    }
}

impl Drop for Dialog {
    fn drop(&mut self) {
        self.registry.finish(&self.conversation);
    }
}

/// Sent when an interceptor that should have loaded an entity did not.
async fn missing<R: Repositories, S: Sender>(
    services: &Services<R, S>,
    session: &Session,
    what: &str,
) -> HandlerResult {
    debug!(chat_id = session.chat_id(), what, "handler reached without entity");
    services
        .say(session.chat_id(), &services.messages().invalid_params)
        .await?;
    Ok(())
}

/// Window requested by the token, or the first page of the configured size.
fn window<R: Repositories, S: Sender>(services: &Services<R, S>, session: &Session) -> Page {
    Page::new(
        session.limit.unwrap_or(services.config.page_size),
        session.offset.unwrap_or(0),
    )
}

/// Back/next buttons for a listing of `total` rows behind `prefix`.
fn navigation(prefix: &str, page: Page, total: u64) -> Vec<Button> {
    let mut buttons = Vec::new();
    if let Some(previous) = page.previous() {
        buttons.push(Button::new(
            "<< Back",
            params::encode(prefix, &Params::page(previous.limit, previous.offset)),
        ));
    }
    let next = page.next();
    if u64::from(next.offset) < total {
        buttons.push(Button::new(
            "Next >>",
            params::encode(prefix, &Params::page(next.limit, next.offset)),
        ));
    }
    buttons
}
