//! Main application entry point for the Connect Four server.
//!
//! Parses the command line, loads the configuration file, installs logging
//! and runs the server until a termination signal arrives.

mod cli;
mod config;
mod logging;
mod signals;

use anyhow::{anyhow, Context};
use cli::CliArgs;
use config::AppConfig;
use connect_four_server::GameServer;
use std::sync::Arc;
use tracing::{error, info};

/// The configured server plus the settings it was built from.
pub struct Application {
    config: AppConfig,
    server: Arc<GameServer>,
}

impl Application {
    /// Loads the configuration, applies CLI overrides and sets up logging.
    pub async fn new(args: CliArgs) -> anyhow::Result<Self> {
        // Load configuration first (before logging setup)
        let mut config = AppConfig::load_from_file(&args.config_path).await?;
        apply_overrides(&mut config, &args);

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        logging::setup_logging(&config.logging)?;
        display_banner();

        let server = Arc::new(GameServer::new(config.to_server_config()?));
        info!("📂 Config: {}", args.config_path.display());

        Ok(Self { config, server })
    }

    /// Serves until SIGINT/SIGTERM, then stops the accept loop.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!(
            "  ⏱️ Handshake timeout: {}s",
            self.config.server.handshake_timeout
        );

        let mut server_handle = {
            let server = self.server.clone();
            tokio::spawn(async move { server.start().await })
        };

        info!("🛑 Press Ctrl+C to gracefully shutdown");

        let interrupted = tokio::select! {
            signal = signals::wait_for_shutdown_signal() => {
                signal.context("Failed to install signal handlers")?;
                true
            }
            finished = &mut server_handle => {
                finished.context("Server task panicked")??;
                false
            }
        };

        if interrupted {
            info!("🛑 Shutdown signal received, initiating graceful shutdown...");
            self.server.shutdown().await?;
            server_handle.await.context("Server task panicked")??;
        }

        info!("✅ Connect Four server shutdown complete");
        Ok(())
    }
}

fn apply_overrides(config: &mut AppConfig, args: &CliArgs) {
    if let Some(bind_address) = &args.bind_address {
        config.server.bind_address = bind_address.clone();
    }
    if let Some(log_level) = &args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
}

fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════╗");
    info!("║     🔴🟡 CONNECT FOUR SERVER      ║");
    info!("║              v{:<8}           ║", version);
    info!("╚══════════════════════════════════╝");
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = CliArgs::parse();

    let app = match Application::new(args).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("❌ Failed to start application: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run().await {
        error!("❌ Application error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_overrides_config() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            config_path: PathBuf::from("unused.toml"),
            bind_address: Some("0.0.0.0:9000".to_string()),
            log_level: Some("debug".to_string()),
            json_logs: true,
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_absent_overrides_keep_file_values() {
        let mut config = AppConfig::default();
        config.logging.json_format = true;
        let args = CliArgs {
            config_path: PathBuf::from("unused.toml"),
            bind_address: None,
            log_level: None,
            json_logs: false,
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.server, AppConfig::default().server);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json_format);
    }
}
