//! Client administration.

use std::sync::Arc;

use coachbot_types::event::{Button, Keyboard};
use coachbot_types::user::{Role, UserPatch};
use tracing::{info, warn};

use crate::middleware::HandlerResult;
use crate::params::{self, Params};
use crate::repository::{Page, Repositories, UserRepository};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// One page of registered clients; pending ones get an approve button.
pub async fn list_users<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let page = Page::new(
        session.limit.unwrap_or(services.config.page_size),
        session.offset.unwrap_or(0),
    );
    let users = services.repos.users().list(page).await?;

    let mut lines = Vec::with_capacity(users.len());
    let mut keyboard = Keyboard::new();
    for user in users.iter().filter(|u| u.role == Role::Client) {
        let status = if user.approved { "approved" } else { "pending" };
        lines.push(format!("{} ({status})", user.username));
        if !user.approved {
            keyboard = keyboard.row(vec![Button::new(
                format!("Approve {}", user.username),
                params::encode("usr_approve", &Params::user(user.id)),
            )]);
        }
    }
    if users.len() as u32 == page.limit {
        let next = page.next();
        keyboard = keyboard.button(
            "Next >>",
            params::encode("usr_list", &Params::page(next.limit, next.offset)),
        );
    }
    keyboard = keyboard.button("Main menu", "menu_main");

    let text = if lines.is_empty() {
        "No clients on this page.".to_string()
    } else {
        lines.join("\n")
    };
    services
        .say_with_keyboard(session.chat_id(), &text, &keyboard)
        .await?;
    Ok(())
}

/// Approve the client referenced by `uid` and let them know.
pub async fn approve_user<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(target) = session.target_user.as_ref() else {
        return super::missing(&services, &session, "user").await;
    };
    let chat_id = session.chat_id();

    if target.approved {
        services
            .say(chat_id, &format!("{} is already approved.", target.username))
            .await?;
        return Ok(());
    }

    let patch = UserPatch {
        approved: Some(true),
        ..UserPatch::default()
    };
    let Some(approved) = services.repos.users().update_by_id(target.id, &patch).await? else {
        services
            .say(chat_id, &services.messages().not_found("User", target.id))
            .await?;
        return Ok(());
    };
    info!(user_id = approved.id, approved_by = session.user_id(), "approved client");

    // The client may have blocked the bot; the approval still stands
    if let Err(err) = services
        .say(approved.chat_id, "Your access has been approved. Use /menu to start.")
        .await
    {
        warn!(user_id = approved.id, error = %err, "could not notify approved client");
    }
    services
        .say(chat_id, &format!("{} approved.", approved.username))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{callback_session, services, user};

    #[tokio::test]
    async fn approve_updates_and_notifies_client() {
        let services = services();
        services.repos.users.insert(user(9, Role::Client, false));
        let mut session = callback_session(1, 1, "usr_approve?uid=9");
        session.target_user = services.repos.users.get(9);

        approve_user(Arc::clone(&services), session).await.unwrap();

        assert!(services.repos.users.get(9).unwrap().approved);
        assert_eq!(services.sender.sent_to(9).len(), 1);
        assert_eq!(services.sender.sent_to(1)[0].text, "user9 approved.");
    }

    #[tokio::test]
    async fn approving_twice_is_harmless() {
        let services = services();
        services.repos.users.insert(user(9, Role::Client, true));
        let mut session = callback_session(1, 1, "usr_approve?uid=9");
        session.target_user = services.repos.users.get(9);

        approve_user(Arc::clone(&services), session).await.unwrap();
        assert_eq!(services.sender.texts(), vec!["user9 is already approved."]);
    }

    #[tokio::test]
    async fn list_offers_approval_for_pending_clients() {
        let services = services();
        services.repos.users.insert(user(1, Role::Admin, true));
        services.repos.users.insert(user(2, Role::Client, true));
        services.repos.users.insert(user(3, Role::Client, false));

        list_users(Arc::clone(&services), callback_session(1, 1, "usr_list"))
            .await
            .unwrap();

        let sent = services.sender.sent();
        assert_eq!(sent[0].text, "user2 (approved)\nuser3 (pending)");
        let keyboard = sent[0].keyboard.as_ref().unwrap();
        assert_eq!(keyboard.rows[0][0].data, "usr_approve?uid=3");
    }
}
