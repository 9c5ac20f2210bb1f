//! Configuration loading and management
//!
//! All paths and timing constants are resolved once at startup and handed to
//! each component by reference; nothing reads ambient globals afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::hotkey::{HotkeyError, KeyCombo};

/// Default hotkey when the config file is missing or malformed: Alt+V.
const DEFAULT_MODIFIERS: &[&str] = &["KEY_LEFTALT"];
const DEFAULT_KEY: &str = "KEY_V";

/// Shared configuration for both processes
#[derive(Debug, Clone)]
pub struct Config {
    /// Rendezvous socket both processes agree on
    pub socket_path: PathBuf,

    /// JSON file holding the persisted clipboard history
    pub history_path: PathBuf,

    /// JSON file holding the hotkey definition
    pub keyconfig_path: PathBuf,

    /// Viewer binary the supervisor launches, plus its arguments
    pub gui_program: PathBuf,
    pub gui_args: Vec<String>,

    /// Clipboard poll period
    pub poll_interval: Duration,

    /// Debounce applied after a window resize/move
    pub configure_debounce: Duration,

    /// Debounce applied after a focus change
    pub focus_debounce: Duration,

    /// Window during which the app's own clipboard writes are ignored
    pub copy_debounce: Duration,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        let config_dir = PathBuf::from(&home).join(".config").join("wlcliphist");

        let socket_path = std::env::var_os("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("wlcliphist.sock");

        // The viewer binary ships next to the hotkey daemon.
        let gui_program = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|d| d.join("wlcliphist-gui")))
            .unwrap_or_else(|| PathBuf::from("wlcliphist-gui"));

        Ok(Self {
            socket_path,
            history_path: config_dir.join("history.json"),
            keyconfig_path: config_dir.join("keyconfig.json"),
            gui_program,
            gui_args: vec!["--hidden".to_string()],
            poll_interval: Duration::from_secs(1),
            configure_debounce: Duration::from_millis(300),
            focus_debounce: Duration::from_millis(200),
            copy_debounce: Duration::from_millis(500),
        })
    }

    /// Load the hotkey combo from `keyconfig_path`
    ///
    /// A missing or unparseable file falls back to the built-in default
    /// without writing it back. A file that parses but names a key evdev
    /// does not know is fatal: running with an undefined combo would listen
    /// forever and never fire.
    pub fn load_combo(&self) -> Result<KeyCombo, HotkeyError> {
        load_combo_from(&self.keyconfig_path)
    }
}

#[derive(Debug, Deserialize)]
struct KeyConfigFile {
    hotkey: HotkeySection,
}

#[derive(Debug, Deserialize)]
struct HotkeySection {
    modifiers: Vec<String>,
    key: String,
}

fn load_combo_from(path: &Path) -> Result<KeyCombo, HotkeyError> {
    let section = match std::fs::read(path) {
        Ok(bytes) => match serde_json::from_slice::<KeyConfigFile>(&bytes) {
            Ok(file) => file.hotkey,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed key config, using default hotkey");
                default_section()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "no key config, using default hotkey");
            default_section()
        }
    };

    let modifier_refs: Vec<&str> = section.modifiers.iter().map(String::as_str).collect();
    KeyCombo::parse(&modifier_refs, &section.key)
}

fn default_section() -> HotkeySection {
    HotkeySection {
        modifiers: DEFAULT_MODIFIERS.iter().map(|s| s.to_string()).collect(),
        key: DEFAULT_KEY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::Key;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wlcliphist-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert!(config.socket_path.to_string_lossy().contains("wlcliphist"));
        assert!(config.history_path.ends_with(".config/wlcliphist/history.json"));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_keyconfig_falls_back_to_default() {
        let combo = load_combo_from(Path::new("/nonexistent/keyconfig.json")).unwrap();
        assert_eq!(combo.key(), Key::KEY_V);
        assert!(combo.modifiers().contains(&Key::KEY_LEFTALT));
    }

    #[test]
    fn test_malformed_keyconfig_falls_back_to_default() {
        let path = temp_path("malformed-keyconfig");
        std::fs::write(&path, b"{not json").unwrap();
        let combo = load_combo_from(&path).unwrap();
        assert_eq!(combo.key(), Key::KEY_V);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_keyconfig_parses_custom_combo() {
        let path = temp_path("custom-keyconfig");
        std::fs::write(
            &path,
            br#"{"hotkey": {"modifiers": ["KEY_LEFTCTRL", "KEY_LEFTSHIFT"], "key": "KEY_H"}}"#,
        )
        .unwrap();
        let combo = load_combo_from(&path).unwrap();
        assert_eq!(combo.key(), Key::KEY_H);
        assert!(combo.modifiers().contains(&Key::KEY_LEFTCTRL));
        assert!(combo.modifiers().contains(&Key::KEY_LEFTSHIFT));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unknown_key_name_is_fatal() {
        let path = temp_path("bad-key-name");
        std::fs::write(
            &path,
            br#"{"hotkey": {"modifiers": ["KEY_LEFTALT"], "key": "KEY_DOES_NOT_EXIST"}}"#,
        )
        .unwrap();
        let err = load_combo_from(&path).unwrap_err();
        assert!(matches!(err, HotkeyError::UnknownKey(_)));
        std::fs::remove_file(&path).ok();
    }
}
