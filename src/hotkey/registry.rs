//! Hotkey registrations
//!
//! Two independent lists: chord hotkeys with a single action, and wheel
//! hotkeys with an up/down action pair. Entries are matched for removal by
//! key-set equality, never by identity.

use std::fmt;
use std::sync::Arc;

use crate::keys::{Combination, KeyCode};

/// Callback run when a hotkey fires
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// A chord bound to one action
#[derive(Clone)]
pub struct Hotkey {
    pub keys: Combination,
    pub action: Action,
}

/// A chord bound to wheel actions. An empty chord matches any wheel event.
#[derive(Clone)]
pub struct ScrollHotkey {
    pub keys: Combination,
    pub up: Action,
    pub down: Action,
}

impl fmt::Debug for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hotkey").field("keys", &self.keys).finish_non_exhaustive()
    }
}

impl fmt::Debug for ScrollHotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollHotkey").field("keys", &self.keys).finish_non_exhaustive()
    }
}

/// All registered hotkeys of one engine.
///
/// Overlapping and duplicate registrations are accepted; which one fires is
/// decided at dispatch time.
#[derive(Debug, Default)]
pub struct Registry {
    hotkeys: Vec<Hotkey>,
    scroll: Vec<ScrollHotkey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a chord hotkey. Empty combinations are refused (returns false).
    pub fn register(&mut self, keys: Combination, action: Action) -> bool {
        if keys.is_empty() {
            return false;
        }
        self.hotkeys.push(Hotkey { keys, action });
        true
    }

    /// Remove every chord hotkey whose key set equals `keys`.
    /// Returns the removed combinations.
    pub fn unregister(&mut self, keys: &[KeyCode]) -> Vec<Combination> {
        let mut removed = Vec::new();
        self.hotkeys.retain(|hotkey| {
            if hotkey.keys.same_keys(keys) {
                removed.push(hotkey.keys.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn register_scroll(&mut self, keys: Combination, up: Action, down: Action) {
        self.scroll.push(ScrollHotkey { keys, up, down });
    }

    /// Remove every wheel hotkey whose key set equals `keys`.
    pub fn unregister_scroll(&mut self, keys: &[KeyCode]) -> Vec<Combination> {
        let mut removed = Vec::new();
        self.scroll.retain(|hotkey| {
            if hotkey.keys.same_keys(keys) {
                removed.push(hotkey.keys.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drop all chord hotkeys, and the wheel hotkeys too if asked.
    pub fn unregister_all(&mut self, include_scroll: bool) {
        self.hotkeys.clear();
        if include_scroll {
            self.scroll.clear();
        }
    }

    /// Snapshot of the chord hotkeys, longest combination first.
    /// Equal lengths keep registration order.
    pub fn by_priority(&self) -> Vec<Hotkey> {
        let mut sorted = self.hotkeys.clone();
        sorted.sort_by(|a, b| b.keys.len().cmp(&a.keys.len()));
        sorted
    }

    pub fn hotkeys(&self) -> &[Hotkey] {
        &self.hotkeys
    }

    pub fn scroll_hotkeys(&self) -> &[ScrollHotkey] {
        &self.scroll
    }
}
