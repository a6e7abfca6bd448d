//! Events module for fired hotkeys
//!
//! Structured notifications published when a hotkey registered through the
//! daemon fires. Subscribed IPC clients receive them as JSON.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::hotkey::{Hotkeys, WheelDirection};
use crate::keys::{Combination, KeyCode};

/// Events emitted when a daemon-owned hotkey fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HotkeyEvent {
    /// A chord hotkey fired on keydown
    Triggered {
        /// Key codes as registered
        keys: Combination,
        /// Human-readable chord, e.g. "Ctrl + C"
        label: String,
    },

    /// A wheel hotkey fired
    Scrolled {
        keys: Combination,
        label: String,
        direction: WheelDirection,
    },
}

impl HotkeyEvent {
    pub fn triggered(keys: Combination) -> Self {
        let label = keys.to_string();
        Self::Triggered { keys, label }
    }

    pub fn scrolled(keys: Combination, direction: WheelDirection) -> Self {
        let label = keys.to_string();
        Self::Scrolled {
            keys,
            label,
            direction,
        }
    }
}

impl std::fmt::Display for HotkeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HotkeyEvent::Triggered { label, .. } => write!(f, "TRIGGERED {}", label),
            HotkeyEvent::Scrolled {
                label, direction, ..
            } => {
                if label.is_empty() {
                    write!(f, "SCROLLED_{}", direction)
                } else {
                    write!(f, "SCROLLED_{} {}", direction, label)
                }
            }
        }
    }
}

/// Register a chord hotkey whose action publishes a `Triggered` event
pub fn bind_chord(hotkeys: &Hotkeys, keys: &[KeyCode], event_tx: &broadcast::Sender<HotkeyEvent>) {
    let event_tx = event_tx.clone();
    let combination = Combination::from(keys);
    hotkeys.register(keys, move || publish(&event_tx, HotkeyEvent::triggered(combination.clone())));
}

/// Register a wheel hotkey whose actions publish `Scrolled` events
pub fn bind_scroll(hotkeys: &Hotkeys, keys: &[KeyCode], event_tx: &broadcast::Sender<HotkeyEvent>) {
    let (up_tx, down_tx) = (event_tx.clone(), event_tx.clone());
    let (up_keys, down_keys) = (Combination::from(keys), Combination::from(keys));
    hotkeys.register_scroll(
        keys,
        move || publish(&up_tx, HotkeyEvent::scrolled(up_keys.clone(), WheelDirection::Up)),
        move || publish(&down_tx, HotkeyEvent::scrolled(down_keys.clone(), WheelDirection::Down)),
    );
}

fn publish(event_tx: &broadcast::Sender<HotkeyEvent>, event: HotkeyEvent) {
    // no subscribers is not an error
    if event_tx.send(event).is_err() {
        trace!("hotkey event dropped, no subscribers");
    }
}
