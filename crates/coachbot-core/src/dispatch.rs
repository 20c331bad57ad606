//! Event dispatcher: picks the interceptor chain and terminal handler for
//! an inbound event.
//!
//! Every event category has its own, explicitly declared interceptor list.
//! Routes are composed once at construction; dispatching an event only
//! looks up the composed handler and runs it inside a tracing span.

use std::collections::HashMap;
use std::sync::Arc;

use coachbot_types::event::{EventKind, InboundEvent};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info_span};

use crate::handlers::{client, day, menu, program, record, reply, route, start, training};
use crate::middleware::{
    Chain, Handler, acknowledge, guard, identity, recover, require_admin, require_approved,
    resolve_params, timeout,
};
use crate::params;
use crate::repository::Repositories;
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Event categories, each with its own interceptor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `/start`, `/cancel`: no identity required.
    System,
    /// `/menu` and `menu_*` callbacks: registered users.
    MainMenu,
    /// `prg_*`, `sub_*`, `exr_*`, `usr_*` callbacks: admins.
    Admin,
    /// `rec_*`, `my_*` callbacks: approved users.
    User,
    /// Free text, usually a conversation reply.
    Text,
    /// Anything no route matches.
    Unknown,
}

impl Category {
    /// Build the interceptor list for this category.
    pub fn chain<R: Repositories, S: Sender>(self, services: &Arc<Services<R, S>>) -> Chain {
        let s = || Arc::clone(services);
        match self {
            Category::System => Chain::new("system")
                .with(recover(s()))
                .with(guard(s()))
                .with(timeout(s())),
            Category::MainMenu => Chain::new("main_menu")
                .with(recover(s()))
                .with(acknowledge(s()))
                .with(identity(s()))
                .with(guard(s()))
                .with(timeout(s())),
            Category::Admin => Chain::new("admin")
                .with(recover(s()))
                .with(acknowledge(s()))
                .with(identity(s()))
                .with(require_admin(s()))
                .with(resolve_params(s()))
                .with(guard(s()))
                .with(timeout(s())),
            Category::User => Chain::new("user")
                .with(recover(s()))
                .with(acknowledge(s()))
                .with(identity(s()))
                .with(require_approved(s()))
                .with(resolve_params(s()))
                .with(guard(s()))
                .with(timeout(s())),
            Category::Text => Chain::new("text").with(recover(s())).with(guard(s())),
            Category::Unknown => Chain::new("unknown")
                .with(recover(s()))
                .with(acknowledge(s())),
        }
    }
}

/// Routes inbound events to composed handlers.
pub struct Dispatcher<R: Repositories, S: Sender> {
    services: Arc<Services<R, S>>,
    commands: HashMap<String, Handler>,
    callbacks: HashMap<String, Handler>,
    text: Handler,
    unknown: Handler,
    /// Parent of every session's cancellation token.
    shutdown: CancellationToken,
}

impl<R: Repositories, S: Sender> Dispatcher<R, S> {
    /// Dispatcher with the built-in command and callback routes.
    pub fn new(services: Arc<Services<R, S>>, shutdown: CancellationToken) -> Self {
        let text = Category::Text
            .chain(&services)
            .then(route(&services, reply::forward_reply));
        let unknown = Category::Unknown
            .chain(&services)
            .then(route(&services, reply::unknown_action));

        let mut dispatcher = Self {
            services: Arc::clone(&services),
            commands: HashMap::new(),
            callbacks: HashMap::new(),
            text,
            unknown,
            shutdown,
        };

        dispatcher.command("start", Category::System, route(&services, start::start));
        dispatcher.command("cancel", Category::System, route(&services, menu::cancel));
        dispatcher.command("menu", Category::MainMenu, route(&services, menu::main_menu));

        dispatcher.callback("menu_main", Category::MainMenu, route(&services, menu::main_menu));
        dispatcher.callback(
            "prg_list",
            Category::Admin,
            route(&services, program::list_programs),
        );
        dispatcher.callback(
            "prg_create",
            Category::Admin,
            route(&services, program::create_program),
        );
        dispatcher.callback(
            "prg_view",
            Category::Admin,
            route(&services, program::show_program),
        );
        dispatcher.callback(
            "prg_rename",
            Category::Admin,
            route(&services, program::rename_program),
        );
        dispatcher.callback(
            "prg_delete",
            Category::Admin,
            route(&services, program::delete_program),
        );
        dispatcher.callback(
            "sub_create",
            Category::Admin,
            route(&services, day::create_sub_program),
        );
        dispatcher.callback(
            "sub_view",
            Category::Admin,
            route(&services, day::show_sub_program),
        );
        dispatcher.callback(
            "sub_rename",
            Category::Admin,
            route(&services, day::rename_sub_program),
        );
        dispatcher.callback(
            "sub_delete",
            Category::Admin,
            route(&services, day::delete_sub_program),
        );
        dispatcher.callback(
            "exr_create",
            Category::Admin,
            route(&services, day::create_exercise),
        );
        dispatcher.callback(
            "exr_rename",
            Category::Admin,
            route(&services, program::rename_exercise),
        );
        dispatcher.callback("usr_list", Category::Admin, route(&services, client::list_users));
        dispatcher.callback(
            "usr_approve",
            Category::Admin,
            route(&services, client::approve_user),
        );
        dispatcher.callback("rec_add", Category::User, route(&services, record::add_record));
        dispatcher.callback("my_records", Category::User, route(&services, record::my_records));
        dispatcher.callback(
            "my_programs",
            Category::User,
            route(&services, training::list_training),
        );
        dispatcher.callback(
            "my_program",
            Category::User,
            route(&services, training::show_training),
        );

        dispatcher
    }

    /// Register a command route, replacing any existing one.
    pub fn command(&mut self, name: &str, category: Category, handler: Handler) {
        let composed = category.chain(&self.services).then(handler);
        self.commands.insert(name.to_string(), composed);
    }

    /// Register a callback route keyed by token prefix.
    pub fn callback(&mut self, prefix: &str, category: Category, handler: Handler) {
        let composed = category.chain(&self.services).then(handler);
        self.callbacks.insert(prefix.to_string(), composed);
    }

    pub fn services(&self) -> &Arc<Services<R, S>> {
        &self.services
    }

    fn handler_for(&self, event: &InboundEvent) -> Handler {
        let found = match &event.kind {
            EventKind::Command { name, .. } => self.commands.get(name.as_str()),
            EventKind::Callback { data } => self.callbacks.get(params::prefix(data)),
            EventKind::Text { .. } => Some(&self.text),
        };
        Arc::clone(found.unwrap_or(&self.unknown))
    }

    /// Run the event through its chain to completion.
    pub async fn dispatch(&self, event: InboundEvent) {
        let span = info_span!(
            "event",
            chat_id = event.chat_id,
            user_id = event.user_id,
            kind = event.kind_label(),
        );
        let handler = self.handler_for(&event);
        let session = Session::new(event, self.shutdown.child_token());

        // The containment interceptor already logs and reports errors
        if let Err(err) = handler(session).instrument(span).await {
            error!(error = %err, "event handler returned an error");
        }
    }
}

impl<R: Repositories, S: Sender> std::fmt::Debug for Dispatcher<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<_> = self.commands.keys().collect();
        commands.sort();
        let mut callbacks: Vec<_> = self.callbacks.keys().collect();
        callbacks.sort();
        f.debug_struct("Dispatcher")
            .field("commands", &commands)
            .field("callbacks", &callbacks)
            .finish()
    }
}
