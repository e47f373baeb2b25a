//! Server configuration types and defaults.

use std::net::SocketAddr;

/// Default listening address of the game server.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:50051";

/// Configuration structure for the game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Whether to set SO_REUSEPORT on the listening socket
    pub use_reuse_port: bool,

    /// Seconds allowed for a client to complete the WebSocket upgrade
    pub handshake_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 50051)),
            use_reuse_port: false,
            handshake_timeout: 10,
        }
    }
}
