//! IPC module for the toggle channel between the two processes

pub mod client;
mod protocol;
mod server;

pub use client::{send_toggle, IpcError};
pub use protocol::{is_toggle, MAX_COMMAND_LEN, TOGGLE};
pub use server::ToggleServer;
