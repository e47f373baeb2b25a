//! Player admission and the shared session state.
//!
//! This module handles the lifecycle of players: admission by network
//! identity, symbol assignment, removal on disconnect and update fan-out.

pub mod client;
pub mod registry;

pub use client::{Player, UpdateSink};
pub use registry::{GameResult, SessionPhase, SessionRegistry, SessionState};

/// Type alias for player identities.
///
/// A player is identified by the remote address of its connection.
pub type Identity = std::net::SocketAddr;
