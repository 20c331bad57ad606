//! Interceptor chain executor.
//!
//! A [`Handler`] consumes a [`Session`] and runs to completion. An
//! [`Interceptor`] takes the next handler and returns a wrapped one. A
//! [`Chain`] is an ordered interceptor list; [`Chain::then`] composes it
//! around a terminal handler so that the first interceptor declared is the
//! outermost. Composition itself has no side effects.
//!
//! Interceptors that abort the chain send their own user-visible message and
//! return `Ok(())`. `Err` is reserved for infrastructure failures and is
//! turned into a generic message by [`recover::recover`].

pub mod acknowledge;
pub mod authorize;
pub mod guard;
pub mod identity;
pub mod params;
pub mod recover;
pub mod timeout;

use std::future::Future;
use std::sync::Arc;

use coachbot_types::error::{RepositoryError, SendError};
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::session::Session;

pub use acknowledge::acknowledge;
pub use authorize::{require_admin, require_approved};
pub use guard::guard;
pub use identity::identity;
pub use params::resolve_params;
pub use recover::recover;
pub use timeout::timeout;

/// Infrastructure failures that escape a handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("send error: {0}")]
    Send(#[from] SendError),
}

pub type HandlerResult = Result<(), HandlerError>;

/// Type-erased event handler.
pub type Handler = Arc<dyn Fn(Session) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Wraps a handler to add cross-cutting behavior.
pub type Interceptor = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Build a [`Handler`] from an async closure.
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Session) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |session| Box::pin(f(session)))
}

/// Build an [`Interceptor`] from a closure over the next handler.
pub fn interceptor_fn<F>(f: F) -> Interceptor
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered list of interceptors for one event category.
#[derive(Clone)]
pub struct Chain {
    name: &'static str,
    interceptors: Vec<Interceptor>,
}

impl Chain {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            interceptors: Vec::new(),
        }
    }

    /// Append an interceptor. Earlier interceptors wrap later ones.
    pub fn with(mut self, interceptor: Interceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Compose the chain around `terminal`.
    pub fn then(&self, terminal: Handler) -> Handler {
        self.interceptors
            .iter()
            .rev()
            .fold(terminal, |next, interceptor| interceptor(next))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
