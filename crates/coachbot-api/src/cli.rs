//! CLI definitions for the `coachbot` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Run the training-program chat bot.
#[derive(Parser)]
#[command(name = "coachbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, env = "COACHBOT_CONFIG", default_value = "coachbot.toml", global = true)]
    pub config: PathBuf,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Read events from stdin and dispatch them (default).
    Serve,

    /// Print the effective configuration as JSON.
    Config,
}

impl Cli {
    /// Log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,coachbot_core=debug,coachbot_api=debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_default() {
        let cli = Cli::try_parse_from(["coachbot"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn flags_parse() {
        let cli =
            Cli::try_parse_from(["coachbot", "-vv", "--otel", "--config", "x.toml", "config"])
                .unwrap();
        assert_eq!(cli.command, Some(Commands::Config));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(cli.otel);
        assert_eq!(cli.log_filter(), "trace");
    }
}
