//! System-wide input hook backed by `rdev`
//!
//! `rdev::listen` blocks its thread for the life of the process and has no
//! shutdown call, so the listener runs on a dedicated thread spawned on the
//! first `start()`. `stop()` only gates delivery; a later `start()` reopens
//! the gate on the same thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use rdev::{listen, Event, EventType, Key};
use tracing::{error, info, trace};

use crate::keys::{codes, KeyCode};

use super::{Channel, Handler, HandlerId, Handlers, HookError, HookEvent, InputHook};

/// How long `start()` waits for `rdev::listen` to fail before assuming it is up
const LISTEN_GRACE: Duration = Duration::from_millis(200);

/// Keypad Enter; not part of the named table
const KP_ENTER: KeyCode = 0x0E1C;

/// Global keyboard and wheel hook for the current desktop session
pub struct RdevHook {
    handlers: Arc<Handlers>,
    delivering: Arc<AtomicBool>,
    spawned: Arc<AtomicBool>,
}

impl RdevHook {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Handlers::new()),
            delivering: Arc::new(AtomicBool::new(false)),
            spawned: Arc::new(AtomicBool::new(false)),
        }
    }

    fn spawn_listener(&self) -> Result<(), HookError> {
        let handlers = Arc::clone(&self.handlers);
        let delivering = Arc::clone(&self.delivering);
        let spawned = Arc::clone(&self.spawned);
        let (failed_tx, failed_rx) = mpsc::channel::<String>();

        thread::Builder::new()
            .name("input-hook".to_string())
            .spawn(move || {
                info!("input hook thread started");

                let gate = Arc::clone(&delivering);
                let result = listen(move |event: Event| {
                    if !gate.load(Ordering::SeqCst) {
                        return;
                    }
                    if let Some(event) = translate(&event.event_type) {
                        handlers.emit(event);
                    }
                });

                if let Err(e) = result {
                    error!(?e, "input hook error");
                    let _ = failed_tx.send(format!("{:?}", e));
                }

                delivering.store(false, Ordering::SeqCst);
                spawned.store(false, Ordering::SeqCst);
                info!("input hook thread stopped");
            })
            .map_err(|e| HookError::ThreadSpawn(e.to_string()))?;

        match failed_rx.recv_timeout(LISTEN_GRACE) {
            Ok(reason) => Err(HookError::Listen(reason)),
            Err(_) => Ok(()),
        }
    }
}

impl Default for RdevHook {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHook for RdevHook {
    fn subscribe(&self, channel: Channel, handler: Handler) -> HandlerId {
        self.handlers.subscribe(channel, handler)
    }

    fn unsubscribe(&self, channel: Channel, id: HandlerId) {
        self.handlers.unsubscribe(channel, id);
    }

    fn start(&self) -> Result<(), HookError> {
        self.delivering.store(true, Ordering::SeqCst);
        if self.spawned.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.spawn_listener().map_err(|e| {
            self.delivering.store(false, Ordering::SeqCst);
            self.spawned.store(false, Ordering::SeqCst);
            e
        })
    }

    fn stop(&self) {
        self.delivering.store(false, Ordering::SeqCst);
    }

    /// False once `stop` is called or the listener thread has exited
    fn is_running(&self) -> bool {
        self.delivering.load(Ordering::SeqCst)
    }
}

/// Convert an rdev event into a hook event. Mouse buttons and moves,
/// unmapped keys and purely horizontal wheel events yield `None`.
fn translate(event_type: &EventType) -> Option<HookEvent> {
    match event_type {
        EventType::KeyPress(key) => key_code(*key).map(HookEvent::KeyDown),
        EventType::KeyRelease(key) => key_code(*key).map(HookEvent::KeyUp),
        // rdev reports downward scrolling as negative delta_y
        EventType::Wheel { delta_y, .. } if *delta_y < 0 => Some(HookEvent::Wheel { rotation: 1 }),
        EventType::Wheel { delta_y, .. } if *delta_y > 0 => Some(HookEvent::Wheel { rotation: -1 }),
        _ => None,
    }
}

/// Map an rdev key onto the hook's key codes
fn key_code(key: Key) -> Option<KeyCode> {
    let code = match key {
        Key::Alt => codes::ALT,
        Key::AltGr => codes::ALT_RIGHT,
        Key::Backspace => codes::BACKSPACE,
        Key::CapsLock => codes::CAPS_LOCK,
        Key::ControlLeft => codes::CTRL,
        Key::ControlRight => codes::CTRL_RIGHT,
        Key::Delete => codes::DELETE,
        Key::DownArrow => codes::ARROW_DOWN,
        Key::End => codes::END,
        Key::Escape => codes::ESCAPE,
        Key::F1 => codes::F1,
        Key::F2 => codes::F2,
        Key::F3 => codes::F3,
        Key::F4 => codes::F4,
        Key::F5 => codes::F5,
        Key::F6 => codes::F6,
        Key::F7 => codes::F7,
        Key::F8 => codes::F8,
        Key::F9 => codes::F9,
        Key::F10 => codes::F10,
        Key::F11 => codes::F11,
        Key::F12 => codes::F12,
        Key::Home => codes::HOME,
        Key::LeftArrow => codes::ARROW_LEFT,
        Key::MetaLeft => codes::META,
        Key::MetaRight => codes::META_RIGHT,
        Key::PageDown => codes::PAGE_DOWN,
        Key::PageUp => codes::PAGE_UP,
        Key::Return => codes::ENTER,
        Key::RightArrow => codes::ARROW_RIGHT,
        Key::ShiftLeft => codes::SHIFT,
        Key::ShiftRight => codes::SHIFT_RIGHT,
        Key::Space => codes::SPACE,
        Key::Tab => codes::TAB,
        Key::UpArrow => codes::ARROW_UP,
        Key::PrintScreen => codes::PRINT_SCREEN,
        Key::ScrollLock => codes::SCROLL_LOCK,
        Key::Pause => codes::PAUSE,
        Key::NumLock => codes::NUM_LOCK,
        Key::BackQuote => codes::BACKQUOTE,
        Key::Num1 => codes::DIGIT_1,
        Key::Num2 => codes::DIGIT_2,
        Key::Num3 => codes::DIGIT_3,
        Key::Num4 => codes::DIGIT_4,
        Key::Num5 => codes::DIGIT_5,
        Key::Num6 => codes::DIGIT_6,
        Key::Num7 => codes::DIGIT_7,
        Key::Num8 => codes::DIGIT_8,
        Key::Num9 => codes::DIGIT_9,
        Key::Num0 => codes::DIGIT_0,
        Key::Minus => codes::MINUS,
        Key::Equal => codes::EQUAL,
        Key::KeyQ => codes::Q,
        Key::KeyW => codes::W,
        Key::KeyE => codes::E,
        Key::KeyR => codes::R,
        Key::KeyT => codes::T,
        Key::KeyY => codes::Y,
        Key::KeyU => codes::U,
        Key::KeyI => codes::I,
        Key::KeyO => codes::O,
        Key::KeyP => codes::P,
        Key::LeftBracket => codes::BRACKET_LEFT,
        Key::RightBracket => codes::BRACKET_RIGHT,
        Key::KeyA => codes::A,
        Key::KeyS => codes::S,
        Key::KeyD => codes::D,
        Key::KeyF => codes::F,
        Key::KeyG => codes::G,
        Key::KeyH => codes::H,
        Key::KeyJ => codes::J,
        Key::KeyK => codes::K,
        Key::KeyL => codes::L,
        Key::SemiColon => codes::SEMICOLON,
        Key::Quote => codes::QUOTE,
        Key::BackSlash => codes::BACKSLASH,
        Key::KeyZ => codes::Z,
        Key::KeyX => codes::X,
        Key::KeyC => codes::C,
        Key::KeyV => codes::V,
        Key::KeyB => codes::B,
        Key::KeyN => codes::N,
        Key::KeyM => codes::M,
        Key::Comma => codes::COMMA,
        Key::Dot => codes::PERIOD,
        Key::Slash => codes::SLASH,
        Key::Insert => codes::INSERT,
        Key::KpReturn => KP_ENTER,
        Key::KpMinus => codes::NUMPAD_SUBTRACT,
        Key::KpPlus => codes::NUMPAD_ADD,
        Key::KpMultiply => codes::NUMPAD_MULTIPLY,
        Key::KpDivide => codes::NUMPAD_DIVIDE,
        Key::Kp0 => codes::NUMPAD_0,
        Key::Kp1 => codes::NUMPAD_1,
        Key::Kp2 => codes::NUMPAD_2,
        Key::Kp3 => codes::NUMPAD_3,
        Key::Kp4 => codes::NUMPAD_4,
        Key::Kp5 => codes::NUMPAD_5,
        Key::Kp6 => codes::NUMPAD_6,
        Key::Kp7 => codes::NUMPAD_7,
        Key::Kp8 => codes::NUMPAD_8,
        Key::Kp9 => codes::NUMPAD_9,
        Key::KpDelete => codes::NUMPAD_DECIMAL,
        Key::IntlBackslash | Key::Function | Key::Unknown(_) => {
            trace!(?key, "unmapped key");
            return None;
        }
    };
    Some(code)
}
