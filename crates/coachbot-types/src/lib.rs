//! Shared domain types for Coachbot.
//!
//! This crate contains the types used across the Coachbot workspace:
//! users, training programs and their children, inbound chat events,
//! configuration, and the error types returned by repositories and senders.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod program;
pub mod user;
