//! Input hook abstraction
//!
//! The engine never talks to the OS directly. It subscribes handlers to an
//! [`InputHook`] on three channels (keydown, keyup, wheel) and starts or
//! stops delivery. Backends:
//! - [`ManualHook`]: events injected by the caller (tests, embedding)
//! - `RdevHook`: system-wide keyboard/mouse hook (feature `os-hook`)

mod manual;
#[cfg(feature = "os-hook")]
mod rdev_hook;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::keys::KeyCode;

pub use manual::ManualHook;
#[cfg(feature = "os-hook")]
pub use rdev_hook::RdevHook;

/// Event channels a handler can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    KeyDown,
    KeyUp,
    Wheel,
}

/// A raw event delivered by the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// `rotation == 1` is a downward scroll, anything else upward
    Wheel { rotation: i32 },
}

impl HookEvent {
    pub fn channel(&self) -> Channel {
        match self {
            HookEvent::KeyDown(_) => Channel::KeyDown,
            HookEvent::KeyUp(_) => Channel::KeyUp,
            HookEvent::Wheel { .. } => Channel::Wheel,
        }
    }
}

/// Event handler registered on a channel
pub type Handler = Arc<dyn Fn(HookEvent) + Send + Sync>;

/// Identifies one subscription, for unsubscribing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Errors that can occur in an input hook
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to spawn hook thread: {0}")]
    ThreadSpawn(String),

    #[error("input hook failed: {0}")]
    Listen(String),
}

/// Source of raw keyboard and wheel events.
///
/// Implementations may deliver from any thread, concurrently; the engine
/// serialises its own handler calls.
pub trait InputHook: Send + Sync {
    fn subscribe(&self, channel: Channel, handler: Handler) -> HandlerId;

    /// Unknown ids are ignored.
    fn unsubscribe(&self, channel: Channel, id: HandlerId);

    fn start(&self) -> Result<(), HookError>;

    /// Safe to call when not started.
    fn stop(&self);

    /// Events are currently being delivered. Turns false when the backend
    /// fails on its own, not only after `stop`.
    fn is_running(&self) -> bool;
}

/// Subscriber table shared by hook backends
#[derive(Default)]
pub struct Handlers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(Channel, HandlerId, Handler)>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: Channel, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((channel, id, handler));
        id
    }

    pub fn unsubscribe(&self, channel: Channel, id: HandlerId) {
        self.lock().retain(|(c, i, _)| !(*c == channel && *i == id));
    }

    /// Number of handlers on `channel`
    pub fn count(&self, channel: Channel) -> usize {
        self.lock().iter().filter(|(c, _, _)| *c == channel).count()
    }

    /// Call every handler subscribed to the event's channel.
    ///
    /// The handler list is copied first, so handlers may subscribe or
    /// unsubscribe while being called.
    pub fn emit(&self, event: HookEvent) {
        let channel = event.channel();
        let handlers: Vec<Handler> = self
            .lock()
            .iter()
            .filter(|(c, _, _)| *c == channel)
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Channel, HandlerId, Handler)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
