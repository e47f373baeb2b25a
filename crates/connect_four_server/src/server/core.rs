//! Core game server implementation.
//!
//! This module contains the `GameServer` struct: it owns the listening socket,
//! the shared session registry and the shutdown signal, and spawns one
//! connection worker per accepted client.

use crate::{
    config::ServerConfig, connection::SessionRegistry, error::ServerError,
    server::handlers::handle_connection,
};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// The Connect Four game server.
///
/// One server hosts exactly one session for two players. Every connection
/// worker shares the same [`SessionRegistry`].
pub struct GameServer {
    /// Server configuration settings
    config: ServerConfig,

    /// The single session shared by all connections
    registry: Arc<SessionRegistry>,

    /// Flips to `true` when shutdown is requested
    shutdown_sender: watch::Sender<bool>,
}

impl GameServer {
    /// Creates a new game server with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration parameters for server behavior
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_sender, _) = watch::channel(false);
        Self {
            config,
            registry: Arc::new(SessionRegistry::new()),
            shutdown_sender,
        }
    }

    /// Binds the listening socket described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Network`] if the socket cannot be created,
    /// bound or registered with the runtime.
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.bind_address;
        let socket = Socket::new(Domain::for_address(address), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::Network(format!("Socket creation failed: {e}")))?;
        socket.set_reuse_address(true).ok();

        if self.config.use_reuse_port {
            #[cfg(unix)]
            {
                if let Err(e) = socket.set_reuse_port(true) {
                    warn!("Failed to enable SO_REUSEPORT: {}", e);
                } else {
                    info!("SO_REUSEPORT enabled");
                }
            }
            #[cfg(not(unix))]
            warn!("SO_REUSEPORT is not supported on this platform");
        }

        socket
            .bind(&address.into())
            .map_err(|e| ServerError::Network(format!("Bind failed: {e}")))?;
        socket
            .listen(1024)
            .map_err(|e| ServerError::Network(format!("Listen failed: {e}")))?;

        let std_listener: StdTcpListener = socket.into();
        std_listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::Network(format!("Failed to set non-blocking: {e}")))?;

        let listener = TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::Network(format!("Tokio listener creation failed: {e}")))?;

        info!("✅ Listener bound on {}", address);
        Ok(listener)
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn start(&self) -> Result<(), ServerError> {
        info!("🚀 Starting Connect Four server on {}", self.config.bind_address);
        let listener = self.bind()?;
        self.serve(listener).await
    }

    /// Accepts connections on `listener` until [`GameServer::shutdown`] is
    /// called.
    ///
    /// Each connection runs on its own task. Workers that are still running
    /// at shutdown are left to finish with their streams.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        let handshake_timeout = Duration::from_secs(self.config.handshake_timeout);

        loop {
            if *shutdown_receiver.borrow_and_update() {
                break;
            }

            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let registry = self.registry.clone();
                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_connection(stream, addr, registry, handshake_timeout).await
                            {
                                error!("Connection error for {}: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
                changed = shutdown_receiver.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Shutdown signal received");
        info!("Server stopped");
        Ok(())
    }

    /// Initiates server shutdown.
    ///
    /// Stops the accept loop. Safe to call before [`GameServer::serve`] runs.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        self.shutdown_sender.send_replace(true);
        Ok(())
    }

    /// Gets the shared session registry.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }
}
