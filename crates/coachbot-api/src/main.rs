//! Coachbot entry point.
//!
//! Binary name: `coachbot`
//!
//! Parses CLI arguments, loads configuration, wires the pipeline to the
//! in-memory repositories and the console sender, then serves events from
//! stdin until EOF or a termination signal.

mod cli;
mod state;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use coachbot_core::ShutdownCoordinator;
use coachbot_infra::config::load_config;
use coachbot_observe::tracing_setup::{init_tracing, shutdown_tracing};
use coachbot_types::config::BotConfig;
use tokio::io::BufReader;
use tracing::{info, warn};

use cli::{Cli, Commands};
use state::AppState;
use transport::ConsoleTransport;

/// Shutdown priorities: the transport stops taking work before the state
/// it feeds is torn down, and logging goes last.
const PRIORITY_TRANSPORT: i32 = 0;
const PRIORITY_CONVERSATIONS: i32 = 10;
const PRIORITY_SESSION_LOCKS: i32 = 20;
const PRIORITY_TRACING: i32 = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_filter(), cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    let config = load_config(&cli.config).await;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Serve => {
            serve(config).await?;
            // The blocking stdin read cannot be cancelled and would keep the
            // runtime from shutting down
            std::process::exit(0);
        }
    }

    Ok(())
}

async fn serve(config: BotConfig) -> anyhow::Result<()> {
    let deadline = Duration::from_secs(config.shutdown_timeout_secs);
    let state = AppState::init(config);
    let coordinator = Arc::new(ShutdownCoordinator::new(deadline));

    let transport = ConsoleTransport::new(Arc::clone(&state.dispatcher));
    let handle = transport.handle();
    coordinator.add_callback("transport", PRIORITY_TRANSPORT, move || async move {
        handle.stop().await;
        Ok(())
    })?;

    let conversations = Arc::clone(&state.services.conversations);
    coordinator.add_callback("conversations", PRIORITY_CONVERSATIONS, move || async move {
        conversations.shutdown();
        Ok(())
    })?;

    let locks = Arc::clone(&state.services.locks);
    coordinator.add_callback("session_locks", PRIORITY_SESSION_LOCKS, move || async move {
        locks.clear();
        Ok(())
    })?;

    coordinator.add_callback("tracing", PRIORITY_TRACING, || async {
        shutdown_tracing().map_err(|e| anyhow::anyhow!("tracer provider shutdown failed: {e}"))
    })?;

    let drain = coordinator.watch(state.shutdown.clone());

    println!(
        "  {} Coachbot reading events from stdin",
        console::style("⚡").bold()
    );
    println!(
        "  {}",
        console::style("Format: <chat_id> <user_id> </command | cb:token | text>").dim()
    );

    let mut reader = tokio::spawn(transport.run(BufReader::new(tokio::io::stdin())));

    tokio::select! {
        _ = shutdown_signal() => info!("termination signal received"),
        result = &mut reader => match result {
            Ok(Ok(())) => info!("input finished"),
            Ok(Err(err)) => warn!(error = %err, "input failed"),
            Err(err) => warn!(error = %err, "transport task failed"),
        },
    }

    state.shutdown.cancel();
    coordinator.wait().await;
    let report = drain.await?;

    if !report.abandoned.is_empty() {
        warn!(abandoned = ?report.abandoned, "shutdown did not finish in time");
    }
    println!("\n  Coachbot stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
