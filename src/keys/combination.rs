//! Key combinations (chords)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::table::{key_code, key_name};
use super::KeyCode;

/// Errors from parsing an accelerator string such as `"CmdOrCtrl+Shift+S"`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("key combination is empty")]
    Empty,

    #[error("unknown key name: {0}")]
    UnknownKey(String),
}

/// An ordered list of key codes registered as one hotkey.
///
/// Matching treats it as a set, but its length is kept as given: it drives
/// the priority order on keydown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination(Vec<KeyCode>);

impl Combination {
    pub fn new(keys: impl Into<Vec<KeyCode>>) -> Self {
        Self(keys.into())
    }

    /// Parse `+`-separated key names, e.g. `"Alt + F4"`.
    pub fn parse(accelerator: &str) -> Result<Self, KeyParseError> {
        if accelerator.trim().is_empty() {
            return Err(KeyParseError::Empty);
        }

        accelerator
            .split('+')
            .map(str::trim)
            .map(|part| key_code(part).ok_or_else(|| KeyParseError::UnknownKey(part.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn keys(&self) -> &[KeyCode] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same key set as `other`: equal length and mutual containment.
    /// Order is irrelevant.
    pub fn same_keys(&self, other: &[KeyCode]) -> bool {
        self.0.len() == other.len()
            && self.0.iter().all(|key| other.contains(key))
            && other.iter().all(|key| self.0.contains(key))
    }
}

impl From<Vec<KeyCode>> for Combination {
    fn from(keys: Vec<KeyCode>) -> Self {
        Self(keys)
    }
}

impl From<&[KeyCode]> for Combination {
    fn from(keys: &[KeyCode]) -> Self {
        Self(keys.to_vec())
    }
}

impl FromStr for Combination {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}", KeyLabel(*code))?;
        }
        Ok(())
    }
}

/// Display adapter for a single key code: its table name, or hex if unnamed
#[derive(Debug, Clone, Copy)]
pub struct KeyLabel(pub KeyCode);

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match key_name(self.0) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:#06x}", self.0),
        }
    }
}
