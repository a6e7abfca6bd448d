//! IPC module for cross-process hotkey registration and notifications

mod protocol;
mod server;

pub use protocol::{
    read_frame, resolve_keys, write_frame, DaemonStatus, KeyRef, Notification, Outgoing, Request,
    Response, MAX_FRAME_LEN,
};
pub use server::Server;
