//! Tracking of currently held keys

use crate::keys::KeyCode;

/// Keys currently held down, in the order they were pressed.
///
/// Behaves as a set: a code is stored at most once. Duplicate presses and
/// releases of keys that were never recorded are absorbed, since OS hooks
/// occasionally drop or repeat transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeys {
    keys: Vec<KeyCode>,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key as held. Returns false if it already was.
    pub fn press(&mut self, code: KeyCode) -> bool {
        if self.contains(code) {
            return false;
        }
        self.keys.push(code);
        true
    }

    /// Forget a held key, keeping the order of the rest.
    /// Returns false if the key was not held.
    pub fn release(&mut self, code: KeyCode) -> bool {
        match self.keys.iter().position(|&k| k == code) {
            Some(i) => {
                self.keys.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    pub fn contains_all(&self, codes: &[KeyCode]) -> bool {
        codes.iter().all(|&code| self.contains(code))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[KeyCode] {
        &self.keys
    }
}
