//! Reference-token decoding and entity resolution.

use std::sync::Arc;

use tracing::warn;

use super::{Handler, HandlerError, Interceptor, handler_fn, interceptor_fn};
use crate::params;
use crate::repository::{
    ExerciseRepository, ProgramRepository, RecordRepository, Repositories, SubProgramRepository,
    UserRepository,
};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Decode the callback token and resolve every referenced entity.
///
/// A malformed token or a dangling id aborts the chain with one message.
/// The pagination window is copied into the session only when set, so the
/// terminal handler keeps control of its defaults.
pub fn resolve_params<R: Repositories, S: Sender>(services: Arc<Services<R, S>>) -> Interceptor {
    interceptor_fn(move |next: Handler| {
        let services = Arc::clone(&services);
        handler_fn(move |session| {
            let services = Arc::clone(&services);
            let next = Arc::clone(&next);
            async move {
                match resolve(&services, session).await? {
                    Some(session) => next(session).await,
                    None => Ok(()),
                }
            }
        })
    })
}

/// Returns `None` when the chain was aborted and the user already told why.
async fn resolve<R: Repositories, S: Sender>(
    services: &Services<R, S>,
    mut session: Session,
) -> Result<Option<Session>, HandlerError> {
    let chat_id = session.chat_id();
    let Some(token) = session.token.as_deref() else {
        return Ok(Some(session));
    };

    let decoded = match params::decode(token) {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!(chat_id, token, error = %err, "rejected reference token");
            services
                .say(chat_id, &services.messages().invalid_params)
                .await?;
            return Ok(None);
        }
    };
    session.params = decoded;
    let repos = &services.repos;

    if decoded.program_id != 0 {
        match repos.programs().get_by_id(decoded.program_id).await? {
            Some(program) => session.program = Some(program),
            None => return not_found(services, chat_id, "Program", decoded.program_id).await,
        }
    }
    if decoded.user_id != 0 {
        match repos.users().get_by_id(decoded.user_id).await? {
            Some(user) => session.target_user = Some(user),
            None => return not_found(services, chat_id, "User", decoded.user_id).await,
        }
    }
    if decoded.exercise_id != 0 {
        match repos.exercises().get_by_id(decoded.exercise_id).await? {
            Some(exercise) => session.exercise = Some(exercise),
            None => return not_found(services, chat_id, "Exercise", decoded.exercise_id).await,
        }
    }
    if decoded.sub_program_id != 0 {
        match repos.sub_programs().get_by_id(decoded.sub_program_id).await? {
            Some(sub_program) => session.sub_program = Some(sub_program),
            None => {
                return not_found(services, chat_id, "Sub-program", decoded.sub_program_id).await;
            }
        }
    }
    if decoded.record_id != 0 {
        match repos.records().get_by_id(decoded.record_id).await? {
            Some(record) => session.record = Some(record),
            None => return not_found(services, chat_id, "Record", decoded.record_id).await,
        }
    }

    if decoded.limit != 0 {
        session.limit = Some(decoded.limit);
    }
    if decoded.offset != 0 {
        session.offset = Some(decoded.offset);
    }
    Ok(Some(session))
}

async fn not_found<R: Repositories, S: Sender>(
    services: &Services<R, S>,
    chat_id: i64,
    entity: &str,
    id: i64,
) -> Result<Option<Session>, HandlerError> {
    warn!(chat_id, entity, id, "dangling reference");
    services
        .say(chat_id, &services.messages().not_found(entity, id))
        .await?;
    Ok(None)
}
