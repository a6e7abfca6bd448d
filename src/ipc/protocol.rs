//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::events::HotkeyEvent;
use crate::keys::{key_code, KeyCode, KeyParseError};

/// Largest frame body accepted from a client
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// A key given by code or by table name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyRef {
    Code(KeyCode),
    Name(String),
}

impl KeyRef {
    pub fn resolve(&self) -> Result<KeyCode, KeyParseError> {
        match self {
            KeyRef::Code(code) => Ok(*code),
            KeyRef::Name(name) => {
                key_code(name).ok_or_else(|| KeyParseError::UnknownKey(name.clone()))
            }
        }
    }
}

/// Resolve a list of key references to codes
pub fn resolve_keys(keys: &[KeyRef]) -> Result<Vec<KeyCode>, KeyParseError> {
    keys.iter().map(KeyRef::resolve).collect()
}

/// Requests from clients to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request current daemon status
    GetStatus,

    /// Register a chord hotkey that publishes a `triggered` event
    Register { keys: Vec<KeyRef> },

    /// Remove chord hotkeys with the same key set
    Unregister { keys: Vec<KeyRef> },

    /// Register a wheel hotkey that publishes `scrolled` events
    RegisterScroll { keys: Vec<KeyRef> },

    /// Remove wheel hotkeys with the same key set
    UnregisterScroll { keys: Vec<KeyRef> },

    /// Remove all chord hotkeys, and wheel hotkeys if asked
    UnregisterAll {
        #[serde(default)]
        include_scroll: bool,
    },

    /// Subscribe to hotkey notifications
    Subscribe,
}

/// Responses from daemon to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// Request applied
    Ok,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Push notification from daemon to subscribed clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A hotkey fired
    Hotkey { event: HotkeyEvent },
}

/// Frame sent from daemon to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outgoing {
    Response(Response),
    Notification(Notification),
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Whether the engine is attached to the input hook
    pub running: bool,

    /// Registered chord hotkeys
    pub hotkeys: usize,

    /// Registered wheel hotkeys
    pub scroll_hotkeys: usize,

    /// Currently held key codes
    pub pressed: Vec<KeyCode>,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            running: false,
            hotkeys: 0,
            scroll_hotkeys: 0,
            pressed: Vec::new(),
            uptime_secs: 0,
        }
    }
}

/// Read one length-prefixed frame. `Ok(None)` on clean end of stream.
pub async fn read_frame<R>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", len),
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Write one length-prefixed JSON frame
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(msg)?;
    let len = (body.len() as u32).to_le_bytes();

    writer.write_all(&len).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;

    Ok(())
}
