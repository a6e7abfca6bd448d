//! Hotkey engine: registration API and run/stop lifecycle
//!
//! The engine subscribes three handlers to its [`InputHook`]. Each handler
//! call holds a dispatch lock for its whole duration, actions included, so
//! events are processed strictly one after another even when a hook
//! delivers from several threads. Engine data sits behind a separate lock
//! that is released before any action runs: an action may register,
//! unregister or stop on the same engine, and the change applies from the
//! next event on.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::hook::{Channel, HandlerId, HookError, HookEvent, InputHook};
use crate::keys::{Combination, KeyCode};

use super::dispatch::EngineState;
use super::registry::Action;

/// State shared between the engine handle and its hook handlers
#[derive(Default)]
struct Shared {
    dispatch: Mutex<()>,
    state: Mutex<EngineState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Process one raw event, running any fired actions after the state
    /// lock is released
    fn handle(&self, event: HookEvent) {
        let _serial = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);

        let actions: Vec<Action> = {
            let mut state = self.state();
            match event {
                HookEvent::KeyDown(code) => state.key_down(code).into_iter().collect(),
                HookEvent::KeyUp(code) => {
                    state.key_up(code);
                    Vec::new()
                }
                HookEvent::Wheel { rotation } => state.wheel(rotation),
            }
        };

        for action in actions {
            action();
        }
    }
}

/// Handler ids held while the engine is subscribed to its hook
#[derive(Debug, Clone, Copy)]
struct Subscriptions {
    key_down: HandlerId,
    key_up: HandlerId,
    wheel: HandlerId,
}

/// Global hotkey engine bound to one input hook.
///
/// Only one engine should be running against the real OS hook at a time;
/// independent engines over separate [`ManualHook`](crate::hook::ManualHook)s
/// are fine.
pub struct Hotkeys {
    hook: Arc<dyn InputHook>,
    shared: Arc<Shared>,
    subscriptions: Mutex<Option<Subscriptions>>,
}

impl Hotkeys {
    /// Create a stopped engine with no registrations
    pub fn new(hook: Arc<dyn InputHook>) -> Self {
        Self {
            hook,
            shared: Arc::new(Shared::default()),
            subscriptions: Mutex::new(None),
        }
    }

    /// Bind `action` to the chord `keys`.
    ///
    /// An empty chord is a usage error: it is logged and nothing is stored.
    pub fn register<F>(&self, keys: &[KeyCode], action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let combination = Combination::from(keys);
        let mut state = self.shared.state();
        if !state.registry.register(combination.clone(), Arc::new(action)) {
            warn!("refusing to register a hotkey with an empty key combination");
            return;
        }
        if state.debug {
            debug!(hotkey = %combination, "registered");
        }
    }

    /// Remove every hotkey whose keys are the same set as `keys`
    pub fn unregister(&self, keys: &[KeyCode]) {
        let mut state = self.shared.state();
        let removed = state.registry.unregister(keys);
        if state.debug {
            for keys in &removed {
                debug!(hotkey = %keys, "unregistered");
            }
        }
    }

    /// Bind wheel actions to the chord `keys`. An empty chord fires on
    /// every wheel event.
    pub fn register_scroll<U, D>(&self, keys: &[KeyCode], up: U, down: D)
    where
        U: Fn() + Send + Sync + 'static,
        D: Fn() + Send + Sync + 'static,
    {
        let combination = Combination::from(keys);
        let mut state = self.shared.state();
        if state.debug {
            debug!(hotkey = %combination, "registered scroll");
        }
        state
            .registry
            .register_scroll(combination, Arc::new(up), Arc::new(down));
    }

    /// Remove every wheel hotkey whose keys are the same set as `keys`
    pub fn unregister_scroll(&self, keys: &[KeyCode]) {
        let mut state = self.shared.state();
        let removed = state.registry.unregister_scroll(keys);
        if state.debug {
            for keys in &removed {
                debug!(hotkey = %keys, "unregistered scroll");
            }
        }
    }

    /// Remove all chord hotkeys, and the wheel hotkeys when `include_scroll`
    pub fn unregister_all(&self, include_scroll: bool) {
        let mut state = self.shared.state();
        state.registry.unregister_all(include_scroll);
        if state.debug {
            debug!("unregistered all hotkeys");
            if include_scroll {
                debug!("unregistered all scroll hotkeys");
            }
        }
    }

    /// Subscribe to the hook and start event delivery.
    ///
    /// Calling `run` again while running does not subscribe twice; it only
    /// updates the debug flag and restarts the hook.
    pub fn run(&self, debug: bool) -> Result<(), HookError> {
        self.shared.state().debug = debug;

        let mut subscriptions = self.subscriptions();
        let fresh = subscriptions.is_none();
        if fresh {
            *subscriptions = Some(self.subscribe());
        }

        if let Err(e) = self.hook.start() {
            if fresh {
                if let Some(subs) = subscriptions.take() {
                    self.unsubscribe(subs);
                }
            }
            return Err(e);
        }

        let enabled = debug;
        info!(debug = enabled, "hotkey engine running");
        Ok(())
    }

    /// Unsubscribe from the hook and stop delivery. Safe without `run`.
    ///
    /// An action already executing is not interrupted.
    pub fn stop(&self) {
        if let Some(subs) = self.subscriptions().take() {
            self.unsubscribe(subs);
        }
        self.hook.stop();
        info!("hotkey engine stopped");
    }

    /// Subscribed to the hook and the hook is delivering events
    pub fn is_running(&self) -> bool {
        self.subscriptions().is_some() && self.hook.is_running()
    }

    pub fn debug(&self) -> bool {
        self.shared.state().debug
    }

    /// Currently held keys, in press order
    pub fn pressed_keys(&self) -> Vec<KeyCode> {
        self.shared.state().pressed.as_slice().to_vec()
    }

    pub fn hotkey_count(&self) -> usize {
        self.shared.state().registry.hotkeys().len()
    }

    pub fn scroll_hotkey_count(&self) -> usize {
        self.shared.state().registry.scroll_hotkeys().len()
    }

    fn subscriptions(&self) -> MutexGuard<'_, Option<Subscriptions>> {
        self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self) -> Subscriptions {
        let handler = |shared: &Arc<Shared>| {
            let shared = Arc::clone(shared);
            Arc::new(move |event: HookEvent| shared.handle(event))
        };

        Subscriptions {
            key_down: self.hook.subscribe(Channel::KeyDown, handler(&self.shared)),
            key_up: self.hook.subscribe(Channel::KeyUp, handler(&self.shared)),
            wheel: self.hook.subscribe(Channel::Wheel, handler(&self.shared)),
        }
    }

    fn unsubscribe(&self, subs: Subscriptions) {
        self.hook.unsubscribe(Channel::KeyDown, subs.key_down);
        self.hook.unsubscribe(Channel::KeyUp, subs.key_up);
        self.hook.unsubscribe(Channel::Wheel, subs.wheel);
    }
}

impl Drop for Hotkeys {
    /// Detach from the hook; the hook itself keeps running for other subscribers
    fn drop(&mut self) {
        if let Some(subs) = self.subscriptions().take() {
            self.unsubscribe(subs);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;
    use crate::hook::ManualHook;
    use crate::keys::codes;

    fn setup() -> (Arc<ManualHook>, Hotkeys) {
        let hook = Arc::new(ManualHook::new());
        let hotkeys = Hotkeys::new(hook.clone());
        (hook, hotkeys)
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn calls(count: &AtomicUsize) -> usize {
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_action_fires_only_with_all_keys_held() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::CMD_OR_CTRL, codes::C], action);
        hotkeys.run(true).unwrap();

        hook.key_down(codes::C);
        assert_eq!(calls(&count), 0);
        hook.key_up(codes::C);
        assert_eq!(calls(&count), 0);

        hook.key_down(codes::CMD_OR_CTRL);
        assert_eq!(calls(&count), 0);
        hook.key_up(codes::CMD_OR_CTRL);
        assert_eq!(calls(&count), 0);

        hook.key_down(codes::CMD_OR_CTRL);
        assert_eq!(calls(&count), 0);
        hook.key_down(codes::C);
        assert_eq!(calls(&count), 1);

        hook.key_up(codes::C);
        hook.key_up(codes::CMD_OR_CTRL);

        hook.key_down(codes::CMD_OR_CTRL);
        hook.key_down(codes::C);
        assert_eq!(calls(&count), 2);
    }

    #[test]
    fn test_modifier_pressed_second_still_fires() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::CMD_OR_CTRL, codes::C], action);
        hotkeys.run(false).unwrap();

        hook.key_down(codes::C);
        assert_eq!(calls(&count), 0);
        hook.key_down(codes::CMD_OR_CTRL);
        assert_eq!(calls(&count), 1);
    }

    #[test]
    fn test_triple_combination_any_order() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::CMD_OR_CTRL, codes::SHIFT, codes::S], action);
        hotkeys.run(true).unwrap();

        hook.key_down(codes::CMD_OR_CTRL);
        hook.key_down(codes::SHIFT);
        assert_eq!(calls(&count), 0);
        hook.key_down(codes::S);
        assert_eq!(calls(&count), 1);

        hook.key_up(codes::S);
        hook.key_up(codes::CMD_OR_CTRL);
        hook.key_up(codes::SHIFT);

        hook.key_down(codes::SHIFT);
        hook.key_down(codes::S);
        assert_eq!(calls(&count), 1);
        hook.key_down(codes::CMD_OR_CTRL);
        assert_eq!(calls(&count), 2);
    }

    #[test]
    fn test_shift_f1() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::SHIFT, codes::F1], action);
        hotkeys.run(true).unwrap();

        hook.key_down(codes::F1);
        assert_eq!(calls(&count), 0);
        hook.key_up(codes::F1);

        hook.key_down(codes::SHIFT);
        assert_eq!(calls(&count), 0);
        hook.key_down(codes::F1);
        assert_eq!(calls(&count), 1);

        hook.key_up(codes::F1);
        hook.key_up(codes::SHIFT);
        assert!(hotkeys.pressed_keys().is_empty());
    }

    #[test]
    fn test_ctrl_numpad1() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::CTRL, codes::NUMPAD_1], action);
        hotkeys.run(true).unwrap();

        hook.key_down(codes::NUMPAD_1);
        hook.key_up(codes::NUMPAD_1);
        hook.key_down(codes::CTRL);
        assert_eq!(calls(&count), 0);
        hook.key_down(codes::NUMPAD_1);
        assert_eq!(calls(&count), 1);
    }

    #[test]
    fn test_subset_hotkeys() {
        let (hook, hotkeys) = setup();
        let (cmd_c, cmd_c_action) = counter();
        let (cmd_shift_c, cmd_shift_c_action) = counter();
        hotkeys.register(&[codes::CMD_OR_CTRL, codes::C], cmd_c_action);
        hotkeys.register(&[codes::CMD_OR_CTRL, codes::SHIFT, codes::C], cmd_shift_c_action);
        hotkeys.run(true).unwrap();

        hook.key_down(codes::CMD_OR_CTRL);
        hook.key_down(codes::C);
        assert_eq!(calls(&cmd_c), 1);
        assert_eq!(calls(&cmd_shift_c), 0);

        hook.key_up(codes::C);
        hook.key_up(codes::CMD_OR_CTRL);

        hook.key_down(codes::CMD_OR_CTRL);
        hook.key_down(codes::SHIFT);
        hook.key_down(codes::C);
        assert_eq!(calls(&cmd_shift_c), 1);
        assert_eq!(calls(&cmd_c), 1);
    }

    #[test]
    fn test_more_keys_than_registered_fire_nothing() {
        let (hook, hotkeys) = setup();
        let (cmd, cmd_action) = counter();
        let (alt, alt_action) = counter();
        hotkeys.register(&[codes::CMD_OR_CTRL, codes::SHIFT, codes::A], cmd_action);
        hotkeys.register(&[codes::ALT, codes::SHIFT, codes::A], alt_action);
        hotkeys.run(true).unwrap();

        for key in [codes::CMD_OR_CTRL, codes::SHIFT, codes::A] {
            hook.key_down(key);
        }
        assert_eq!((calls(&cmd), calls(&alt)), (1, 0));
        for key in [codes::A, codes::SHIFT, codes::CMD_OR_CTRL] {
            hook.key_up(key);
        }

        for key in [codes::ALT, codes::SHIFT, codes::A] {
            hook.key_down(key);
        }
        assert_eq!((calls(&cmd), calls(&alt)), (1, 1));
        for key in [codes::A, codes::SHIFT, codes::ALT] {
            hook.key_up(key);
        }

        for key in [codes::CMD_OR_CTRL, codes::ALT, codes::SHIFT, codes::A] {
            hook.key_down(key);
        }
        assert_eq!((calls(&cmd), calls(&alt)), (1, 1));
    }

    #[test]
    fn test_duplicate_keydown_does_not_grow_or_retrigger() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::ALT, codes::SPACE], action);
        hotkeys.run(false).unwrap();

        hook.key_down(codes::ALT);
        hook.key_down(codes::SPACE);
        hook.key_down(codes::SPACE);
        hook.key_down(codes::ALT);

        assert_eq!(calls(&count), 1);
        assert_eq!(hotkeys.pressed_keys(), vec![codes::ALT, codes::SPACE]);
    }

    #[test]
    fn test_stray_keyup_is_absorbed() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::ALT, codes::SPACE], action);
        hotkeys.run(false).unwrap();

        hook.key_up(codes::ESCAPE);
        hook.key_down(codes::ALT);
        hook.key_down(codes::SPACE);
        assert_eq!(calls(&count), 1);
    }

    #[test]
    fn test_unregister_by_set_equality() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::A, codes::B], action);
        hotkeys.run(false).unwrap();

        hotkeys.unregister(&[codes::B, codes::A]);
        assert_eq!(hotkeys.hotkey_count(), 0);

        hook.key_down(codes::A);
        hook.key_down(codes::B);
        assert_eq!(calls(&count), 0);
    }

    #[test]
    fn test_empty_combination_is_refused() {
        let (_hook, hotkeys) = setup();
        hotkeys.register(&[], || {});
        assert_eq!(hotkeys.hotkey_count(), 0);
    }

    #[test]
    fn test_unregister_all_and_scroll() {
        let (_hook, hotkeys) = setup();
        hotkeys.register(&[codes::A], || {});
        hotkeys.register_scroll(&[], || {}, || {});

        hotkeys.unregister_all(false);
        assert_eq!(hotkeys.hotkey_count(), 0);
        assert_eq!(hotkeys.scroll_hotkey_count(), 1);

        hotkeys.unregister_all(true);
        assert_eq!(hotkeys.scroll_hotkey_count(), 0);
    }

    #[test]
    fn test_wheel_fans_out_to_all_matches() {
        let (hook, hotkeys) = setup();
        let (any_up, any_up_action) = counter();
        let (any_down, any_down_action) = counter();
        let (alt_up, alt_up_action) = counter();
        let (alt_down, alt_down_action) = counter();
        hotkeys.register_scroll(&[], any_up_action, any_down_action);
        hotkeys.register_scroll(&[codes::ALT], alt_up_action, alt_down_action);
        hotkeys.run(true).unwrap();

        hook.key_down(codes::ALT);
        hook.wheel(1);
        assert_eq!((calls(&any_down), calls(&alt_down)), (1, 1));

        hook.wheel(-1);
        assert_eq!((calls(&any_up), calls(&alt_up)), (1, 1));

        hook.key_up(codes::ALT);
        hook.wheel(-1);
        assert_eq!((calls(&any_up), calls(&alt_up)), (2, 1));

        hotkeys.unregister_scroll(&[]);
        hook.wheel(-1);
        assert_eq!(calls(&any_up), 2);
    }

    #[test]
    fn test_run_is_idempotent() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::F2], action);

        hotkeys.run(false).unwrap();
        hotkeys.run(true).unwrap();
        assert!(hotkeys.debug());
        assert_eq!(hook.subscriber_count(Channel::KeyDown), 1);

        hook.key_down(codes::F2);
        assert_eq!(calls(&count), 1);
    }

    #[test]
    fn test_stop_detaches_and_is_safe_without_run() {
        let (hook, hotkeys) = setup();
        hotkeys.stop();
        assert_eq!(hook.stop_count(), 1);

        let (count, action) = counter();
        hotkeys.register(&[codes::F3], action);
        hotkeys.run(false).unwrap();
        hotkeys.stop();

        assert!(!hotkeys.is_running());
        assert_eq!(hook.subscriber_count(Channel::KeyDown), 0);
        assert_eq!(hook.subscriber_count(Channel::KeyUp), 0);
        assert_eq!(hook.subscriber_count(Channel::Wheel), 0);

        hook.start().unwrap();
        hook.key_down(codes::F3);
        assert_eq!(calls(&count), 0);
    }

    #[test]
    fn test_engines_on_separate_hooks_are_isolated() {
        let (hook_a, hotkeys_a) = setup();
        let (_hook_b, hotkeys_b) = setup();
        let (a, a_action) = counter();
        let (b, b_action) = counter();
        hotkeys_a.register(&[codes::F6], a_action);
        hotkeys_b.register(&[codes::F6], b_action);
        hotkeys_a.run(false).unwrap();
        hotkeys_b.run(false).unwrap();

        hook_a.key_down(codes::F6);
        assert_eq!((calls(&a), calls(&b)), (1, 0));
    }

    #[test]
    fn test_action_may_mutate_registry() {
        let hook = Arc::new(ManualHook::new());
        let hotkeys = Arc::new(Hotkeys::new(hook.clone()));
        let (count, action) = counter();
        let action = Arc::new(action);

        let engine = Arc::clone(&hotkeys);
        let follow_up = Arc::clone(&action);
        hotkeys.register(&[codes::F7], move || {
            engine.unregister(&[codes::F7]);
            let follow_up = Arc::clone(&follow_up);
            engine.register(&[codes::F8], move || follow_up());
        });
        hotkeys.run(false).unwrap();

        hook.key_down(codes::F7);
        assert_eq!(hotkeys.hotkey_count(), 1);
        assert_eq!(calls(&count), 0);

        hook.key_up(codes::F7);
        hook.key_down(codes::F8);
        assert_eq!(calls(&count), 1);
    }

    #[test]
    fn test_action_may_stop_engine() {
        let hook = Arc::new(ManualHook::new());
        let hotkeys = Arc::new(Hotkeys::new(hook.clone()));
        let engine = Arc::clone(&hotkeys);
        hotkeys.register(&[codes::ESCAPE], move || engine.stop());
        hotkeys.run(false).unwrap();

        hook.key_down(codes::ESCAPE);
        assert!(!hotkeys.is_running());
        assert!(!hook.is_running());
    }

    #[test]
    fn test_panicking_action_propagates_and_engine_recovers() {
        let (hook, hotkeys) = setup();
        let (count, action) = counter();
        hotkeys.register(&[codes::F9], || panic!("action failed"));
        hotkeys.register(&[codes::F10], action);
        hotkeys.run(false).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| hook.key_down(codes::F9)));
        assert!(result.is_err());

        hook.key_up(codes::F9);
        hook.key_down(codes::F10);
        assert_eq!(calls(&count), 1);
    }

    #[test]
    fn test_dropped_engine_detaches_from_hook() {
        let hook = Arc::new(ManualHook::new());
        let (count, action) = counter();
        {
            let hotkeys = Hotkeys::new(hook.clone());
            hotkeys.register(&[codes::F1], action);
            hotkeys.run(false).unwrap();
            assert_eq!(hook.subscriber_count(Channel::KeyDown), 1);
        }

        assert_eq!(hook.subscriber_count(Channel::KeyDown), 0);
        assert_eq!(hook.subscriber_count(Channel::KeyUp), 0);
        assert_eq!(hook.subscriber_count(Channel::Wheel), 0);

        hook.key_down(codes::F1);
        assert_eq!(calls(&count), 0);
    }

    #[test]
    fn test_is_running_follows_the_hook() {
        let (hook, hotkeys) = setup();
        assert!(!hotkeys.is_running());

        hotkeys.run(false).unwrap();
        assert!(hotkeys.is_running());

        // backend gave up on its own
        hook.stop();
        assert!(!hotkeys.is_running());

        hotkeys.run(false).unwrap();
        assert!(hotkeys.is_running());
    }

    #[test]
    fn test_concurrent_delivery_is_serialised() {
        const ROUNDS: usize = 200;
        let keys = [
            codes::A,
            codes::B,
            codes::C,
            codes::D,
            codes::E,
            codes::F,
            codes::G,
            codes::H,
        ];

        let (hook, hotkeys) = setup();
        let active = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let (fired, count_fire) = counter();

        let (a, o) = (Arc::clone(&active), Arc::clone(&overlaps));
        hotkeys.register_scroll(
            &[],
            move || {
                if a.fetch_add(1, Ordering::SeqCst) != 0 {
                    o.fetch_add(1, Ordering::SeqCst);
                }
                count_fire();
                thread::yield_now();
                a.fetch_sub(1, Ordering::SeqCst);
            },
            || {},
        );
        hotkeys.run(false).unwrap();

        let hook = &*hook;
        thread::scope(|s| {
            for key in keys {
                s.spawn(move || {
                    for _ in 0..ROUNDS {
                        hook.key_down(key);
                        hook.wheel(-1);
                        hook.key_up(key);
                    }
                });
            }
        });

        assert_eq!(calls(&fired), keys.len() * ROUNDS);
        assert_eq!(calls(&overlaps), 0);
        assert!(hotkeys.pressed_keys().is_empty());
    }
}
