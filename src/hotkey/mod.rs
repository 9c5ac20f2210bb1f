//! Hotkey module for global keyboard event listening
//!
//! Reads key events straight from /dev/input via evdev, which works under
//! Wayland where compositor-level capture is unavailable. Requires read
//! access to the event devices (membership in the `input` group).

mod keys;
mod listener;

pub use keys::{ComboMatcher, KeyCombo, KeyTransition};
pub use listener::{HotkeyError, HotkeyListener, KeyEvent};
