//! qhotkeys: global hotkey engine
//!
//! Observes raw keydown/keyup/wheel events from an input hook, keeps the
//! set of held keys, and fires the action registered for a key chord at
//! the moment that exact chord is held.
//!
//! ```
//! use std::sync::Arc;
//! use qhotkeys::hook::ManualHook;
//! use qhotkeys::keys::codes;
//! use qhotkeys::Hotkeys;
//!
//! let hook = Arc::new(ManualHook::new());
//! let hotkeys = Hotkeys::new(hook.clone());
//! hotkeys.register(&[codes::CMD_OR_CTRL, codes::C], || println!("copy"));
//! hotkeys.run(false)?;
//!
//! hook.key_down(codes::CMD_OR_CTRL);
//! hook.key_down(codes::C); // prints "copy"
//! # Ok::<(), qhotkeys::hook::HookError>(())
//! ```
//!
//! The `qhotkeys-daemon` binary (feature `os-hook`) runs an engine against
//! the system input hook and serves it to other processes over a Unix socket.

pub mod config;
pub mod events;
pub mod hook;
pub mod hotkey;
pub mod ipc;
pub mod keys;
pub mod lifecycle;

pub use hotkey::{Hotkeys, WheelDirection};
pub use keys::{Combination, KeyCode};
