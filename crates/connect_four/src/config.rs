//! Configuration management for the Connect Four server.
//!
//! This module handles loading, validation and conversion of the TOML
//! configuration file.

use anyhow::Context;
use connect_four_server::config::DEFAULT_BIND_ADDRESS;
use connect_four_server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

/// Log levels accepted by `logging.level`.
const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration settings
    pub server: ServerSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the server to (e.g., "127.0.0.1:50051")
    pub bind_address: String,
    /// Whether to set SO_REUSEPORT on the listening socket (Unix only)
    #[serde(default)]
    pub use_reuse_port: bool,
    /// Seconds a client gets to complete the WebSocket upgrade
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: u64,
}

fn default_handshake_timeout() -> u64 {
    ServerConfig::default().handshake_timeout
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: DEFAULT_BIND_ADDRESS.to_string(),
                use_reuse_port: false,
                handshake_timeout: default_handshake_timeout(),
            },
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration there and
    /// returns it.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Checks the configuration for values the server cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                self.server.bind_address
            ));
        }

        if self.server.handshake_timeout == 0 {
            return Err("Handshake timeout must be at least 1 second".to_string());
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {VALID_LEVELS:?}",
                self.logging.level
            ));
        }

        Ok(())
    }

    /// Converts to the library's [`ServerConfig`].
    pub fn to_server_config(&self) -> anyhow::Result<ServerConfig> {
        Ok(ServerConfig {
            bind_address: self
                .server
                .bind_address
                .parse()
                .with_context(|| format!("Invalid bind address: {}", self.server.bind_address))?,
            use_reuse_port: self.server.use_reuse_port,
            handshake_timeout: self.server.handshake_timeout,
        })
    }
}
