//! JSON encoding of commands and updates.

use super::types::{Command, Update};
use crate::error::ServerError;

/// Parses one text frame into a [`Command`].
///
/// # Errors
///
/// Returns [`ServerError::Protocol`] for malformed JSON, an unknown `command`
/// tag or missing fields.
pub fn decode_command(text: &str) -> Result<Command, ServerError> {
    serde_json::from_str(text).map_err(|e| ServerError::Protocol(format!("Invalid command: {e}")))
}

/// Serializes an [`Update`] into the text of an outbound frame.
pub fn encode_update(update: &Update) -> Result<String, ServerError> {
    serde_json::to_string(update)
        .map_err(|e| ServerError::Protocol(format!("Failed to encode update: {e}")))
}
