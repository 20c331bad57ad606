use thiserror::Error;

/// Errors from repository operations (used by trait definitions in coachbot-core).
///
/// A missing entity is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the outbound message sender.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("chat {0} is not reachable")]
    ChatUnreachable(i64),

    #[error("transport error: {0}")]
    Transport(String),
}
