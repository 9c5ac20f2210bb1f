//! The toggle channel wire protocol
//!
//! There is exactly one command: the literal bytes "toggle", no framing, no
//! payload, no response. The sender connects, writes, and closes.

/// The single command understood by the viewer process
pub const TOGGLE: &[u8] = b"toggle";

/// Upper bound on a command read; anything longer is not a valid command
pub const MAX_COMMAND_LEN: usize = 64;

/// Check whether a received payload is the toggle command
pub fn is_toggle(payload: &[u8]) -> bool {
    payload == TOGGLE
}
