//! Observability setup for Coachbot.

pub mod tracing_setup;
