//! Role and approval gates.

use std::sync::Arc;

use coachbot_types::user::User;
use tracing::debug;

use super::{Handler, Interceptor, handler_fn, interceptor_fn};
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;

/// Only approved admins pass.
pub fn require_admin<R: Repositories, S: Sender>(services: Arc<Services<R, S>>) -> Interceptor {
    gate(services, "admin", User::is_admin)
}

/// Only approved users (of any role) pass.
pub fn require_approved<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
) -> Interceptor {
    gate(services, "approved", |user: &User| user.approved)
}

/// Must run after the identity interceptor; a session without a user is
/// denied.
fn gate<R, S, P>(services: Arc<Services<R, S>>, gate: &'static str, allowed: P) -> Interceptor
where
    R: Repositories,
    S: Sender,
    P: Fn(&User) -> bool + Copy + Send + Sync + 'static,
{
    interceptor_fn(move |next: Handler| {
        let services = Arc::clone(&services);
        handler_fn(move |session| {
            let services = Arc::clone(&services);
            let next = Arc::clone(&next);
            async move {
                if !session.user.as_ref().is_some_and(allowed) {
                    debug!(user_id = session.user_id(), gate, "access denied");
                    services
                        .say(session.chat_id(), &services.messages().access_denied)
                        .await?;
                    return Ok(());
                }
                next(session).await
            }
        })
    })
}
