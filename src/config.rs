//! Configuration loading and management
//!
//! Environment variables:
//! - `QHOTKEYS_SOCKET`: IPC socket path (default `~/.local/share/qhotkeys/daemon.sock`)
//! - `QHOTKEYS_DEBUG`: `1`/`true` to log every key transition
//! - `QHOTKEYS_BINDINGS`: `;`-separated accelerators registered at startup,
//!   e.g. `CmdOrCtrl+Shift+S; Alt+F1`

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::keys::Combination;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Engine debug logging
    pub debug: bool,

    /// Hotkeys registered at startup; they publish events like IPC ones
    pub bindings: Vec<Combination>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup("HOME").context("HOME is not set")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("qhotkeys");

        let socket_path = lookup("QHOTKEYS_SOCKET")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("daemon.sock"));

        let debug = match lookup("QHOTKEYS_DEBUG") {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("invalid QHOTKEYS_DEBUG value: {:?}", value))?,
            None => false,
        };

        let bindings = match lookup("QHOTKEYS_BINDINGS") {
            Some(value) => parse_bindings(&value).context("invalid QHOTKEYS_BINDINGS")?,
            None => Vec::new(),
        };

        Ok(Self {
            socket_path,
            data_dir,
            debug,
            bindings,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_bindings(value: &str) -> Result<Vec<Combination>> {
    value
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            Combination::parse(part).with_context(|| format!("bad binding {:?}", part.trim()))
        })
        .collect()
}
