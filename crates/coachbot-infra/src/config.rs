//! Configuration loader for Coachbot.
//!
//! Reads a TOML file into [`BotConfig`]. Falls back to defaults when the
//! file is missing or malformed so the bot always starts.

use std::path::Path;

use coachbot_types::config::BotConfig;
use thiserror::Error;

/// Reasons a configuration file is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<BotConfig, ConfigError> {
    let config: BotConfig = toml::from_str(content)?;
    if config.page_size == 0 {
        return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
    }
    if config.shutdown_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "shutdown_timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(config)
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`BotConfig::default()`].
/// - If the file cannot be read or fails to parse or validate, logs a
///   warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(path: &Path) -> BotConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return BotConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return BotConfig::default();
        }
    };

    match parse_config(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Rejected {}: {err}, using defaults", path.display());
            BotConfig::default()
        }
    }
}
