//! Infrastructure implementations for Coachbot.
//!
//! Implements the repository and sender traits defined in `coachbot-core`
//! and loads the bot configuration from disk.

pub mod config;
pub mod console;
pub mod memory;
