//! Inbound event pipeline and repository trait definitions for Coachbot.
//!
//! This crate defines the "ports" (repository and sender traits) that the
//! infrastructure layer implements, plus everything that runs between an
//! inbound chat event and the business handler: the interceptor chain, the
//! conversation engine, the per-session lock table, the timeout supervisor
//! and the shutdown orchestrator. It never depends on `coachbot-infra`.

pub mod conversation;
pub mod dispatch;
pub mod handlers;
pub mod lock;
pub mod middleware;
pub mod panics;
pub mod params;
pub mod repository;
pub mod sender;
pub mod services;
pub mod session;
pub mod shutdown;
pub mod timeout;

#[cfg(test)]
pub(crate) mod testing;

pub use conversation::{Conversation, ConversationError, ConversationRegistry};
pub use dispatch::{Category, Dispatcher};
pub use lock::{SessionGuard, SessionLocks};
pub use params::{ParamError, Params};
pub use services::Services;
pub use session::Session;
pub use shutdown::ShutdownCoordinator;
