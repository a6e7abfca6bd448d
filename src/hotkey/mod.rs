//! Hotkey engine
//!
//! Tracks held keys, stores registrations and decides on every raw event
//! which registered action fires.

mod dispatch;
mod engine;
mod pressed;
mod registry;

pub use dispatch::{EngineState, WheelDirection, ROTATION_DOWN};
pub use engine::Hotkeys;
pub use pressed::PressedKeys;
pub use registry::{Action, Hotkey, Registry, ScrollHotkey};
