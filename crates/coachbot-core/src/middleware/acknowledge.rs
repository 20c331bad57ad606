//! Callback acknowledgement.

use std::sync::Arc;

use tracing::warn;

use super::{Handler, Interceptor, handler_fn, interceptor_fn};
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;

/// Acknowledge callback events with the platform before anything else runs.
///
/// A failed acknowledgement aborts the chain with the `ack_failed` message.
/// Commands and text are passed through untouched.
pub fn acknowledge<R: Repositories, S: Sender>(services: Arc<Services<R, S>>) -> Interceptor {
    interceptor_fn(move |next: Handler| {
        let services = Arc::clone(&services);
        handler_fn(move |session| {
            let services = Arc::clone(&services);
            let next = Arc::clone(&next);
            async move {
                if session.token.is_some()
                    && !services.sender.answer_inbound_event(&session.event.id).await
                {
                    warn!(event_id = %session.event.id, "failed to acknowledge callback");
                    services
                        .say(session.chat_id(), &services.messages().ack_failed)
                        .await?;
                    return Ok(());
                }
                next(session).await
            }
        })
    })
}
