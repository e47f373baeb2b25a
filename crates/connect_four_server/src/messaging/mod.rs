//! Messages exchanged between players and the server.
//!
//! Inbound frames decode into the closed [`Command`] set, outbound frames are
//! encoded from [`Update`]. The wire wording lives in [`text`].

pub mod codec;
pub mod text;
pub mod types;

pub use codec::{decode_command, encode_update};
pub use types::{Command, Update};
