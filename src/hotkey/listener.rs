//! Keyboard device enumeration and event reading
//!
//! One reader thread per keyboard-capable device. Each thread blocks on
//! `fetch_events` and forwards key transitions into an mpsc channel; the
//! matcher consumes that channel on the async side.

use std::path::PathBuf;
use std::time::Duration;

use evdev::{Device, InputEventKind, Key};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::keys::KeyTransition;

/// One key transition from any keyboard device
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent {
    pub key: Key,
    pub transition: KeyTransition,
}

/// Errors that can occur while setting up the hotkey listener
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("no keyboard-capable input device found (is the user in the `input` group?)")]
    NoKeyboard,

    #[error("unknown key name: {0}")]
    UnknownKey(String),

    #[error("the main key must not appear in the modifier set, and at least one modifier is required")]
    InvalidCombo,

    #[error("failed to spawn reader thread: {0}")]
    ThreadSpawn(String),
}

/// Global hotkey listener feeding key events into a channel
pub struct HotkeyListener {
    event_tx: mpsc::Sender<KeyEvent>,
}

impl HotkeyListener {
    pub fn new(event_tx: mpsc::Sender<KeyEvent>) -> Self {
        Self { event_tx }
    }

    /// Open all keyboard devices and start one reader thread per device
    ///
    /// Fails fast if no keyboard is found; running without one would never
    /// produce a toggle. Individual read errors later on are logged and the
    /// affected device keeps being polled. Consumes the listener so the
    /// channel closes once every reader thread has stopped.
    pub fn start(self) -> Result<(), HotkeyError> {
        let devices = keyboard_devices();
        if devices.is_empty() {
            return Err(HotkeyError::NoKeyboard);
        }

        for (path, device) in devices {
            let name = device.name().unwrap_or("unnamed").to_string();
            info!(device = %name, path = %path.display(), "watching keyboard device");

            let event_tx = self.event_tx.clone();
            std::thread::Builder::new()
                .name(format!("evdev-{}", path.display()))
                .spawn(move || read_loop(device, &name, event_tx))
                .map_err(|e| HotkeyError::ThreadSpawn(e.to_string()))?;
        }

        Ok(())
    }
}

/// Enumerate /dev/input and keep devices that look like keyboards
fn keyboard_devices() -> Vec<(PathBuf, Device)> {
    evdev::enumerate()
        .filter(|(_, device)| {
            let named_keyboard = device
                .name()
                .map(|n| n.to_lowercase().contains("keyboard"))
                .unwrap_or(false);
            let has_letter_keys = device
                .supported_keys()
                .map(|keys| keys.contains(Key::KEY_A))
                .unwrap_or(false);
            named_keyboard || has_letter_keys
        })
        .collect()
}

/// Blocking per-device read loop
fn read_loop(mut device: Device, name: &str, event_tx: mpsc::Sender<KeyEvent>) {
    loop {
        let events = match device.fetch_events() {
            Ok(events) => events,
            // ENODEV: the device was unplugged
            Err(e) if e.raw_os_error() == Some(19) => {
                warn!(device = name, "device disappeared, stopping reader");
                return;
            }
            Err(e) => {
                warn!(device = name, error = %e, "device read failed, retrying");
                std::thread::sleep(Duration::from_millis(100));
                continue;
            }
        };

        for event in events {
            let InputEventKind::Key(key) = event.kind() else {
                continue;
            };
            // value 0 = release, 1 = press, 2 = autorepeat
            let transition = match event.value() {
                0 => KeyTransition::Up,
                _ => KeyTransition::Down,
            };
            debug!(device = name, ?key, ?transition, "key event");

            if event_tx.blocking_send(KeyEvent { key, transition }).is_err() {
                debug!(device = name, "event channel closed, stopping reader");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let _listener = HotkeyListener::new(tx);
    }
}
