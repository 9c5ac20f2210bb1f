//! wlcliphist: Wayland clipboard history with a global hotkey toggle
//!
//! Two cooperating processes:
//! - `wlcliphist-hotkeyd` watches raw keyboard input via evdev and fires a
//!   toggle when the configured combo becomes fully held
//! - `wlcliphist-gui` owns the history: it polls the clipboard through the
//!   wl-clipboard tools, persists accepted entries as JSON, and flips its
//!   window visibility when the toggle arrives over a Unix socket
//!
//! The hotkey process has no window-manager privileges; all coordination
//! happens over the socket. If no viewer is listening, the hotkey process
//! launches one in hidden mode.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod history;
pub mod hotkey;
pub mod ipc;
pub mod lifecycle;
pub mod poller;
pub mod supervisor;
