//! Configuration management for the serfer dispatcher.
//!
//! This module handles loading and validation of the dispatcher configuration
//! from TOML files. Command-line overrides are applied by the application.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

fn default_queue_capacity() -> usize {
    1024
}

fn default_drain_timeout_ms() -> u64 {
    5000
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Dispatcher configuration settings
    pub dispatcher: DispatcherSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Dispatch loop configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherSettings {
    /// Prefix marking user events that belong to this application
    pub service_prefix: String,
    /// Capacity of the bounded inbound event queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// How long to wait for queued events to be handled once input ends
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dispatcher: DispatcherSettings {
                service_prefix: "serfer".to_string(),
                queue_capacity: default_queue_capacity(),
                drain_timeout_ms: default_drain_timeout_ms(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file, creating it with defaults if it
    /// does not exist.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        let prefix = &self.dispatcher.service_prefix;
        if prefix.is_empty() {
            return Err("Service prefix cannot be empty".to_string());
        }
        if prefix.contains(':') {
            return Err(format!(
                "Service prefix must not contain ':' (got {prefix:?})"
            ));
        }

        if self.dispatcher.queue_capacity == 0 {
            return Err("dispatcher.queue_capacity must be greater than 0".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
