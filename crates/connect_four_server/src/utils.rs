//! Utility functions for creating servers.

use crate::config::ServerConfig;
use crate::server::GameServer;

/// Creates a server listening on the default address.
pub fn create_server() -> GameServer {
    GameServer::new(ServerConfig::default())
}

/// Creates a server with a custom configuration.
///
/// # Arguments
///
/// * `config` - Settings for the listener and connection workers
pub fn create_server_with_config(config: ServerConfig) -> GameServer {
    GameServer::new(config)
}
