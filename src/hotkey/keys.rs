//! Combo definition and press-state tracking
//!
//! `KeyCombo` is parsed once at startup and immutable afterwards.
//! `ComboMatcher` consumes the raw key event stream and decides when the
//! combo transitions from "not fully held" to "fully held".

use std::collections::HashSet;
use std::str::FromStr;

use evdev::Key;

use super::listener::HotkeyError;

/// A key press or release as seen on the device stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Down,
    Up,
}

/// The configured modifier set plus main key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    modifiers: HashSet<Key>,
    key: Key,
}

impl KeyCombo {
    /// Build a combo, enforcing that the main key is not also a modifier
    /// and that at least one modifier is present.
    pub fn new(modifiers: HashSet<Key>, key: Key) -> Result<Self, HotkeyError> {
        if modifiers.is_empty() || modifiers.contains(&key) {
            return Err(HotkeyError::InvalidCombo);
        }
        Ok(Self { modifiers, key })
    }

    /// Resolve key names (evdev `KEY_*` form) into a combo
    pub fn parse(modifiers: &[&str], key: &str) -> Result<Self, HotkeyError> {
        let modifiers = modifiers
            .iter()
            .map(|name| resolve_key(name))
            .collect::<Result<HashSet<Key>, _>>()?;
        Self::new(modifiers, resolve_key(key)?)
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn modifiers(&self) -> &HashSet<Key> {
        &self.modifiers
    }

    /// True when every required key is in `pressed`
    pub fn is_held_in(&self, pressed: &HashSet<Key>) -> bool {
        self.modifiers.is_subset(pressed) && pressed.contains(&self.key)
    }
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.modifiers.iter().map(|k| format!("{k:?}")).collect();
        names.sort();
        names.push(format!("{:?}", self.key));
        write!(f, "{}", names.join("+"))
    }
}

fn resolve_key(name: &str) -> Result<Key, HotkeyError> {
    Key::from_str(name).map_err(|_| HotkeyError::UnknownKey(name.to_string()))
}

/// Tracks the currently held keys and detects combo activation edges
///
/// Firing is edge-triggered: `on_event` returns true exactly when the event
/// completes the combo, and not again until some required key has been
/// released. Key-repeat events for an already-held key are idempotent.
#[derive(Debug)]
pub struct ComboMatcher {
    combo: KeyCombo,
    pressed: HashSet<Key>,
    satisfied: bool,
}

impl ComboMatcher {
    pub fn new(combo: KeyCombo) -> Self {
        Self {
            combo,
            pressed: HashSet::new(),
            satisfied: false,
        }
    }

    /// Feed one key event; returns true when the combo just became fully held
    pub fn on_event(&mut self, key: Key, transition: KeyTransition) -> bool {
        match transition {
            KeyTransition::Down => {
                self.pressed.insert(key);
            }
            KeyTransition::Up => {
                self.pressed.remove(&key);
            }
        }

        let held = self.combo.is_held_in(&self.pressed);
        let fired = held && !self.satisfied;
        self.satisfied = held;
        fired
    }

    pub fn pressed(&self) -> &HashSet<Key> {
        &self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::KeyTransition::{Down, Up};

    fn alt_v() -> KeyCombo {
        KeyCombo::parse(&["KEY_LEFTALT"], "KEY_V").unwrap()
    }

    fn matcher() -> ComboMatcher {
        ComboMatcher::new(alt_v())
    }

    #[test]
    fn test_combo_rejects_main_key_as_modifier() {
        let err = KeyCombo::parse(&["KEY_V"], "KEY_V").unwrap_err();
        assert!(matches!(err, HotkeyError::InvalidCombo));
    }

    #[test]
    fn test_combo_rejects_empty_modifiers() {
        let err = KeyCombo::new(HashSet::new(), Key::KEY_V).unwrap_err();
        assert!(matches!(err, HotkeyError::InvalidCombo));
    }

    #[test]
    fn test_fires_when_combo_becomes_held() {
        let mut m = matcher();
        assert!(!m.on_event(Key::KEY_LEFTALT, Down));
        assert!(m.on_event(Key::KEY_V, Down));
    }

    #[test]
    fn test_fires_regardless_of_press_order() {
        let mut m = matcher();
        assert!(!m.on_event(Key::KEY_V, Down));
        assert!(m.on_event(Key::KEY_LEFTALT, Down));
    }

    #[test]
    fn test_does_not_fire_on_partial_combo() {
        let mut m = matcher();
        assert!(!m.on_event(Key::KEY_LEFTALT, Down));
        assert!(!m.on_event(Key::KEY_C, Down));
        assert!(!m.on_event(Key::KEY_C, Up));
        assert_eq!(m.pressed().len(), 1);
    }

    #[test]
    fn test_extra_held_keys_do_not_block_firing() {
        // Held set may be a strict superset of the combo.
        let mut m = matcher();
        assert!(!m.on_event(Key::KEY_LEFTSHIFT, Down));
        assert!(!m.on_event(Key::KEY_LEFTALT, Down));
        assert!(m.on_event(Key::KEY_V, Down));
    }

    #[test]
    fn test_repeat_down_while_held_does_not_refire() {
        // Strict interpretation: autorepeat of the main key while the combo
        // stays held is idempotent, not a new trigger.
        let mut m = matcher();
        m.on_event(Key::KEY_LEFTALT, Down);
        assert!(m.on_event(Key::KEY_V, Down));
        assert!(!m.on_event(Key::KEY_V, Down));
        assert!(!m.on_event(Key::KEY_V, Down));
    }

    #[test]
    fn test_refires_only_after_release_and_reestablish() {
        let mut m = matcher();
        m.on_event(Key::KEY_LEFTALT, Down);
        assert!(m.on_event(Key::KEY_V, Down));

        // Releasing the main key re-arms the matcher.
        assert!(!m.on_event(Key::KEY_V, Up));
        assert!(m.on_event(Key::KEY_V, Down));

        // Releasing a modifier re-arms it too.
        assert!(!m.on_event(Key::KEY_LEFTALT, Up));
        assert!(!m.on_event(Key::KEY_V, Up));
        assert!(!m.on_event(Key::KEY_V, Down));
        assert!(m.on_event(Key::KEY_LEFTALT, Down));
    }

    #[test]
    fn test_unrelated_release_does_not_rearm() {
        let mut m = matcher();
        m.on_event(Key::KEY_LEFTSHIFT, Down);
        m.on_event(Key::KEY_LEFTALT, Down);
        assert!(m.on_event(Key::KEY_V, Down));
        // Shift is not part of the combo; releasing it changes nothing.
        assert!(!m.on_event(Key::KEY_LEFTSHIFT, Up));
        assert!(!m.on_event(Key::KEY_V, Down));
    }

    #[test]
    fn test_multi_modifier_combo() {
        let combo = KeyCombo::parse(&["KEY_LEFTCTRL", "KEY_LEFTSHIFT"], "KEY_H").unwrap();
        let mut m = ComboMatcher::new(combo);
        assert!(!m.on_event(Key::KEY_LEFTCTRL, Down));
        assert!(!m.on_event(Key::KEY_H, Down));
        assert!(m.on_event(Key::KEY_LEFTSHIFT, Down));
    }

    #[test]
    fn test_combo_display() {
        assert_eq!(alt_v().to_string(), "KEY_LEFTALT+KEY_V");
    }
}
