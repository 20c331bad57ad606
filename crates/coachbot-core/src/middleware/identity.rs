//! Sender identity resolution.

use std::sync::Arc;

use tracing::debug;

use super::{Handler, Interceptor, handler_fn, interceptor_fn};
use crate::repository::{Repositories, UserRepository};
use crate::sender::Sender;
use crate::services::Services;

/// Look up the sending user and store it in the session.
///
/// An unknown sender is asked to register and the chain stops. Repository
/// failures propagate to the containment interceptor.
pub fn identity<R: Repositories, S: Sender>(services: Arc<Services<R, S>>) -> Interceptor {
    interceptor_fn(move |next: Handler| {
        let services = Arc::clone(&services);
        handler_fn(move |mut session| {
            let services = Arc::clone(&services);
            let next = Arc::clone(&next);
            async move {
                let Some(user) = services.repos.users().get_by_id(session.user_id()).await? else {
                    debug!(user_id = session.user_id(), "unregistered sender");
                    services
                        .say(session.chat_id(), &services.messages().not_registered)
                        .await?;
                    return Ok(());
                };
                session.user = Some(user);
                next(session).await
            }
        })
    })
}
