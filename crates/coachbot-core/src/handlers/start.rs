//! `/start`: registration.

use std::sync::Arc;

use chrono::Utc;
use coachbot_types::user::{Role, User};
use tracing::info;

use crate::middleware::HandlerResult;
use crate::repository::{Repositories, UserRepository};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Register the sender, or greet them if they already exist.
///
/// Ids listed in `admins` are registered as approved admins; everyone else
/// starts as an unapproved client.
pub async fn start<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let chat_id = session.chat_id();
    let users = services.repos.users();

    if let Some(user) = users.get_by_id(session.user_id()).await? {
        services
            .say(chat_id, &format!("Welcome back, {}.", user.username))
            .await?;
        return Ok(());
    }

    let is_admin = services.config.admins.contains(&session.user_id());
    let user = User {
        id: session.user_id(),
        chat_id,
        username: session
            .event
            .username
            .clone()
            .unwrap_or_else(|| format!("user{}", session.user_id())),
        role: if is_admin { Role::Admin } else { Role::Client },
        approved: is_admin,
        created_at: Utc::now(),
    };
    let user = users.create(&user).await?;
    info!(user_id = user.id, role = %user.role, "registered user");

    let text = if user.is_admin() {
        format!("Registered {} as admin. Use /menu to start.", user.username)
    } else {
        format!(
            "Registered {}. An admin has to approve your access.",
            user.username
        )
    };
    services.say(chat_id, &text).await?;
    Ok(())
}
