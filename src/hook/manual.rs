//! In-process input hook
//!
//! Events are injected by the caller instead of coming from the OS. Used
//! to drive engines in tests, and by hosts that already own an event source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::trace;

use crate::keys::KeyCode;

use super::{Channel, Handler, HandlerId, Handlers, HookError, HookEvent, InputHook};

/// Hook whose events are pushed by hand
#[derive(Default)]
pub struct ManualHook {
    handlers: Handlers,
    running: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl ManualHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&self, code: KeyCode) {
        self.emit(HookEvent::KeyDown(code));
    }

    pub fn key_up(&self, code: KeyCode) {
        self.emit(HookEvent::KeyUp(code));
    }

    pub fn wheel(&self, rotation: i32) {
        self.emit(HookEvent::Wheel { rotation });
    }

    /// Deliver an event to subscribers. Dropped unless the hook is started.
    pub fn emit(&self, event: HookEvent) {
        if !self.is_running() {
            trace!(?event, "hook stopped, event dropped");
            return;
        }
        self.handlers.emit(event);
    }

    /// Handlers currently subscribed to `channel`
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.handlers.count(channel)
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl InputHook for ManualHook {
    fn subscribe(&self, channel: Channel, handler: Handler) -> HandlerId {
        self.handlers.subscribe(channel, handler)
    }

    fn unsubscribe(&self, channel: Channel, id: HandlerId) {
        self.handlers.unsubscribe(channel, id);
    }

    fn start(&self) -> Result<(), HookError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
