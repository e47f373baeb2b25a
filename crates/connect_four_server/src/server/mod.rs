//! Server networking and per-connection protocol handling.
//!
//! * [`core`] - listener setup, accept loop and shutdown
//! * [`handlers`] - the WebSocket worker run for each accepted stream
//! * [`session`] - command processing against the shared session

pub mod core;
pub mod handlers;
pub mod session;

pub use self::core::GameServer;
pub use session::{GameSession, SessionFlow};
