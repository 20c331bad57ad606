//! Application state wiring the pipeline to concrete infrastructure.

use std::sync::Arc;

use coachbot_core::{Dispatcher, Services};
use coachbot_infra::console::ConsoleSender;
use coachbot_infra::memory::MemoryRepositories;
use coachbot_types::config::BotConfig;
use tokio_util::sync::CancellationToken;

/// Services pinned to the in-memory repositories and the console sender.
pub type ConcreteServices = Services<MemoryRepositories, ConsoleSender>;

pub type ConcreteDispatcher = Dispatcher<MemoryRepositories, ConsoleSender>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ConcreteServices>,
    pub dispatcher: Arc<ConcreteDispatcher>,
    /// Cancelled when the process starts shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn init(config: BotConfig) -> Self {
        let shutdown = CancellationToken::new();
        let services = Arc::new(Services::new(
            MemoryRepositories::new(),
            ConsoleSender::new(),
            config,
        ));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&services), shutdown.clone()));
        Self {
            services,
            dispatcher,
            shutdown,
        }
    }
}
