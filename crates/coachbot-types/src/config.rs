//! Configuration types for Coachbot.
//!
//! `BotConfig` represents the top-level `config.toml` that controls handler
//! timeouts, shutdown deadlines, pagination and the fixed user-visible texts.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the bot.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Upper bound for a handler chain that may wait on a conversation.
    #[serde(default = "default_handler_timeout_secs")]
    pub handler_timeout_secs: u64,

    /// Overall deadline for draining shutdown callbacks.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Maximum number of bytes of a captured stack trace that get logged.
    #[serde(default = "default_stack_trace_limit")]
    pub stack_trace_limit: usize,

    /// Page size used by list screens when the token carries no limit.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// User ids registered as approved admins on `/start`.
    #[serde(default)]
    pub admins: Vec<i64>,

    #[serde(default)]
    pub messages: Messages,
}

fn default_handler_timeout_secs() -> u64 {
    300
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

fn default_stack_trace_limit() -> usize {
    4096
}

fn default_page_size() -> u32 {
    10
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            handler_timeout_secs: default_handler_timeout_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            stack_trace_limit: default_stack_trace_limit(),
            page_size: default_page_size(),
            admins: Vec::new(),
            messages: Messages::default(),
        }
    }
}

/// Fixed texts sent on the pipeline's abort paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub timeout: String,
    pub access_denied: String,
    pub not_registered: String,
    pub generic_error: String,
    /// `{entity}` and `{id}` are substituted.
    pub not_found: String,
    pub ack_failed: String,
    pub invalid_params: String,
    pub unknown_action: String,
    pub no_conversation: String,
    pub cancelled: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            timeout: "Time is up. Start the action again from the menu.".to_string(),
            access_denied: "You do not have access to this action.".to_string(),
            not_registered: "You are not registered yet. Send /start to register.".to_string(),
            generic_error: "Something went wrong. Please try again later.".to_string(),
            not_found: "{entity} {id} not found.".to_string(),
            ack_failed: "Could not process the button press. Please try again.".to_string(),
            invalid_params: "This button is no longer valid.".to_string(),
            unknown_action: "Unknown action.".to_string(),
            no_conversation: "Use /menu to choose an action.".to_string(),
            cancelled: "Cancelled.".to_string(),
        }
    }
}

impl Messages {
    /// Render the not-found template for an entity kind and id.
    pub fn not_found(&self, entity: &str, id: i64) -> String {
        self.not_found
            .replace("{entity}", entity)
            .replace("{id}", &id.to_string())
    }
}
