use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Current keyboard state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Keys currently held.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an input event to the held state.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Release events are not delivered while unfocused.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state: KeyState::Pressed } => self.press(key),
            InputEvent::Key { key, state: KeyState::Released } => self.release(key),
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// True when any of `keys` is held.
    pub fn any_down(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.keys_down.contains(k))
    }

    /// Marks `key` as held without going through the platform layer.
    ///
    /// Used by headless drivers and tests.
    pub fn press(&mut self, key: Key) {
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }
}
