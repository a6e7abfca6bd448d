//! Per-event dispatch
//!
//! Decides, for every raw keydown/keyup/wheel event, which registered
//! actions fire. Matching rules:
//!
//! - keydown: candidates are tried longest first, and the first one whose
//!   keys are all held *and* whose length equals the number of held keys
//!   fires. At most one action per keydown. The rule is re-evaluated on
//!   every keydown, so walking through the sizes of two nested chords can
//!   fire the shorter one before the longer one.
//! - keyup: only updates the held set.
//! - wheel: every scroll hotkey whose keys are all held (or whose chord is
//!   empty) fires, with no size requirement.
//!
//! Dispatch returns the actions to run instead of running them, so the
//! caller can release its locks first.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keys::{KeyCode, KeyLabel};

use super::pressed::PressedKeys;
use super::registry::{Action, Registry};

/// Wheel rotation value the hook reports for a downward scroll
pub const ROTATION_DOWN: i32 = 1;

/// Direction of a wheel event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelDirection {
    Up,
    Down,
}

impl WheelDirection {
    /// `1` is downward; every other rotation value counts as upward.
    pub fn from_rotation(rotation: i32) -> Self {
        if rotation == ROTATION_DOWN {
            Self::Down
        } else {
            Self::Up
        }
    }
}

impl fmt::Display for WheelDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelDirection::Up => write!(f, "UP"),
            WheelDirection::Down => write!(f, "DOWN"),
        }
    }
}

/// Held keys, registrations and the debug flag of one engine
#[derive(Debug, Default)]
pub struct EngineState {
    pub pressed: PressedKeys,
    pub registry: Registry,
    pub debug: bool,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keydown. Returns the action to fire, if any.
    pub fn key_down(&mut self, code: KeyCode) -> Option<Action> {
        // held keys auto-repeat; only the first transition counts
        if !self.pressed.press(code) {
            return None;
        }

        if self.debug {
            debug!(key = %KeyLabel(code), pressed = self.pressed.len(), "pressed");
        }

        let held = &self.pressed;
        let hotkey = self
            .registry
            .by_priority()
            .into_iter()
            .find(|hotkey| {
                hotkey.keys.len() == held.len() && held.contains_all(hotkey.keys.keys())
            })?;

        if self.debug {
            debug!(hotkey = %hotkey.keys, "hotkey triggered");
        }

        Some(hotkey.action)
    }

    /// Handle a keyup. Never fires anything.
    pub fn key_up(&mut self, code: KeyCode) {
        self.pressed.release(code);

        if self.debug {
            debug!(key = %KeyLabel(code), pressed = self.pressed.len(), "let go");
        }
    }

    /// Handle a wheel event. Returns every matching action, in registration order.
    pub fn wheel(&self, rotation: i32) -> Vec<Action> {
        let scroll = self.registry.scroll_hotkeys();
        if scroll.is_empty() {
            return Vec::new();
        }

        let direction = WheelDirection::from_rotation(rotation);
        if self.debug {
            debug!(%direction, rotation, "scrolled");
        }

        let held = &self.pressed;
        scroll
            .iter()
            .filter(|hotkey| hotkey.keys.is_empty() || held.contains_all(hotkey.keys.keys()))
            .map(|hotkey| {
                if self.debug {
                    debug!(hotkey = %hotkey.keys, %direction, "scroll hotkey triggered");
                }
                match direction {
                    WheelDirection::Up => hotkey.up.clone(),
                    WheelDirection::Down => hotkey.down.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::keys::{codes, Combination};

    fn counter() -> (Arc<AtomicUsize>, Action) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn fire(action: Option<Action>) {
        if let Some(action) = action {
            action();
        }
    }

    #[test]
    fn test_wheel_direction_convention() {
        assert_eq!(WheelDirection::from_rotation(1), WheelDirection::Down);
        assert_eq!(WheelDirection::from_rotation(-1), WheelDirection::Up);
        assert_eq!(WheelDirection::from_rotation(0), WheelDirection::Up);
        assert_eq!(WheelDirection::from_rotation(2), WheelDirection::Up);
    }

    #[test]
    fn test_repeat_keydown_is_ignored() {
        let mut state = EngineState::new();
        let (count, action) = counter();
        state.registry.register(Combination::new([codes::F5]), action);

        fire(state.key_down(codes::F5));
        fire(state.key_down(codes::F5));
        fire(state.key_down(codes::F5));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(state.pressed.len(), 1);
    }

    #[test]
    fn test_extra_key_does_not_retrigger() {
        let mut state = EngineState::new();
        let (count, action) = counter();
        state.registry.register(Combination::new([codes::CTRL, codes::C]), action);

        fire(state.key_down(codes::CTRL));
        fire(state.key_down(codes::C));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        fire(state.key_down(codes::X));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // releasing the extra key does not fire either: keyup never dispatches
        state.key_up(codes::X);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_longer_combination_wins_at_its_size() {
        let mut state = EngineState::new();
        let (short, short_action) = counter();
        let (long, long_action) = counter();
        state.registry.register(Combination::new([codes::CTRL, codes::C]), short_action);
        state
            .registry
            .register(Combination::new([codes::CTRL, codes::SHIFT, codes::C]), long_action);

        fire(state.key_down(codes::CTRL));
        fire(state.key_down(codes::SHIFT));
        fire(state.key_down(codes::C));

        assert_eq!(short.load(Ordering::SeqCst), 0);
        assert_eq!(long.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nested_chords_fire_in_sequence() {
        // pressing Ctrl, C, then Shift passes through the size of the
        // shorter chord first; each keydown is matched on its own
        let mut state = EngineState::new();
        let (short, short_action) = counter();
        let (long, long_action) = counter();
        state.registry.register(Combination::new([codes::CTRL, codes::C]), short_action);
        state
            .registry
            .register(Combination::new([codes::CTRL, codes::SHIFT, codes::C]), long_action);

        fire(state.key_down(codes::CTRL));
        fire(state.key_down(codes::C));
        fire(state.key_down(codes::SHIFT));

        assert_eq!(short.load(Ordering::SeqCst), 1);
        assert_eq!(long.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_equal_length_ties_fire_first_registered() {
        let mut state = EngineState::new();
        let (first, first_action) = counter();
        let (second, second_action) = counter();
        state.registry.register(Combination::new([codes::ALT, codes::A]), first_action);
        state.registry.register(Combination::new([codes::A, codes::ALT]), second_action);

        fire(state.key_down(codes::A));
        fire(state.key_down(codes::ALT));

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_repeated_code_chord_matches_on_length() {
        // [A, A] needs two held keys, but only A has to be among them
        let mut state = EngineState::new();
        let (count, action) = counter();
        state.registry.register(Combination::new([codes::A, codes::A]), action);

        fire(state.key_down(codes::A));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        fire(state.key_down(codes::ALT));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wheel_without_scroll_hotkeys_is_noop() {
        let mut state = EngineState::new();
        state.key_down(codes::ALT);
        assert!(state.wheel(1).is_empty());
    }

    #[test]
    fn test_wheel_fires_every_subset_match() {
        let mut state = EngineState::new();
        let (any_up, any_up_action) = counter();
        let (any_down, any_down_action) = counter();
        let (alt_up, alt_up_action) = counter();
        let (alt_down, alt_down_action) = counter();
        let (ctrl_up, ctrl_up_action) = counter();
        let (_, ctrl_down_action) = counter();

        state
            .registry
            .register_scroll(Combination::default(), any_up_action, any_down_action);
        state
            .registry
            .register_scroll(Combination::new([codes::ALT]), alt_up_action, alt_down_action);
        state
            .registry
            .register_scroll(Combination::new([codes::CTRL]), ctrl_up_action, ctrl_down_action);

        state.key_down(codes::ALT);
        state.key_down(codes::SHIFT);

        for action in state.wheel(1) {
            action();
        }
        assert_eq!(any_down.load(Ordering::SeqCst), 1);
        assert_eq!(alt_down.load(Ordering::SeqCst), 1);
        assert_eq!(any_up.load(Ordering::SeqCst), 0);

        for action in state.wheel(-1) {
            action();
        }
        assert_eq!(any_up.load(Ordering::SeqCst), 1);
        assert_eq!(alt_up.load(Ordering::SeqCst), 1);
        assert_eq!(ctrl_up.load(Ordering::SeqCst), 0);
    }
}
