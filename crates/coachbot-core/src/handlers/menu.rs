//! Main menu and `/cancel`.

use std::sync::Arc;

use coachbot_types::event::Keyboard;
use coachbot_types::user::Role;

use crate::middleware::HandlerResult;
use crate::params::{self, Params};
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Render the main menu for the sender's role.
pub async fn main_menu<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(user) = session.user.as_ref() else {
        return super::missing(&services, &session, "user").await;
    };

    let mut keyboard = Keyboard::new();
    if user.is_admin() {
        keyboard = keyboard
            .button("Programs", params::encode("prg_list", &Params::default()))
            .button("New program", "prg_create")
            .button("Clients", params::encode("usr_list", &Params::default()));
    }
    if user.approved && user.role == Role::Client {
        keyboard = keyboard
            .button("Training", params::encode("my_programs", &Params::default()))
            .button("My records", "my_records");
    }

    let text = if keyboard.is_empty() {
        "Main menu. Your access is waiting for approval."
    } else {
        "Main menu"
    };
    services
        .say_with_keyboard(session.chat_id(), text, &keyboard)
        .await?;
    Ok(())
}

/// Close the chat's open conversation, if any.
///
/// The handler parked on it wakes up and exits without replying.
pub async fn cancel<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let chat_id = session.chat_id();
    let text = if services.conversations.delete(chat_id) {
        &services.messages().cancelled
    } else {
        &services.messages().no_conversation
    };
    services.say(chat_id, text).await?;
    Ok(())
}
