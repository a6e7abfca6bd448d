//! Key codes, names and combinations
//!
//! A `KeyCode` is the integer the input hook reports for a key. The table
//! maps symbolic names to codes, including platform-resolved aliases.

mod combination;
mod table;

pub use combination::{Combination, KeyLabel, KeyParseError};
pub use table::{codes, key_code, key_name, KEY_NAMES};

/// Identifier of a physical or logical key as reported by the input hook
pub type KeyCode = u16;
