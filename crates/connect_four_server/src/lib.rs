//! # Connect Four Server
//!
//! A WebSocket server that hosts one game of Connect Four between two remote
//! players.
//!
//! ## Game Model
//!
//! * The board has 6 rows and 7 columns; a piece drops to the lowest empty
//!   cell of its column
//! * The first player to connect plays `o` and moves first, the second plays
//!   `x`
//! * Four in a row horizontally, vertically or diagonally wins; a full board
//!   without a winner is a tie
//!
//! ## Message Flow
//!
//! 1. A client opens a WebSocket and sends JSON commands tagged by `command`:
//!    `connect`, `move`, `show_board` or `check_turn`
//! 2. The connection worker decodes the frame and hands it to its
//!    [`GameSession`]
//! 3. The session validates the command against the shared state under the
//!    registry lock, applies it and queues updates (`{message, board?}`)
//! 4. Each connection's writer task drains its queue into the socket
//!
//! Rejections (full game, wrong turn, invalid column) only reach the sender.
//!
//! ## Concurrency
//!
//! All game state lives in one [`SessionState`] behind the single lock of the
//! [`SessionRegistry`]. Every mutation and the broadcast that reports it run
//! while the lock is held, so both players observe the same order of events.
//!
//! ## Error Handling
//!
//! * [`GameError`] - rule violations, reported to the client as plain text
//! * [`ServerError`] - network, stream and protocol failures

pub use config::ServerConfig;
pub use connection::{SessionPhase, SessionRegistry, SessionState};
pub use error::{GameError, ServerError};
pub use server::{GameServer, GameSession, SessionFlow};
pub use utils::{create_server, create_server_with_config};

pub mod config;
pub mod connection;
pub mod error;
pub mod game;
pub mod messaging;
pub mod server;
pub mod utils;
