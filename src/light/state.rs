//! Shared state of one light.
//!
//! `LightState` is the source of truth for a light: its identity, what it
//! supports, the values it currently shows and the values it was last asked
//! to reach. Changes are requested through [`LightCall`] and, once the light
//! settles on its target, every target-state-reached listener is invoked.
//!
//! Uses `parking_lot` locks so a light can be shared between the protocol
//! side and whatever drives the hardware. No lock is held while listeners
//! run, so a listener may read the light or issue another call.

use super::call::LightCall;
use super::traits::LightTraits;
use super::values::LightColorValues;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Callback fired when a light reaches its target state.
pub type TargetStateReachedListener = Arc<dyn Fn(&LightState) + Send + Sync>;

/// Handle of one target-state-reached subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Build the object id from a display name: lower-cased, spaces become
/// underscores, anything outside `[a-z0-9_-]` becomes an underscore.
pub fn object_id_from_name(name: &str) -> String {
    name.chars()
        .map(|c| match c.to_ascii_lowercase() {
            c @ ('a'..='z' | '0'..='9' | '_' | '-') => c,
            _ => '_',
        })
        .collect()
}

/// 32-bit FNV-1 hash.
pub fn fnv1_hash(data: &str) -> u32 {
    data.bytes().fold(2_166_136_261u32, |hash, byte| {
        hash.wrapping_mul(16_777_619) ^ u32::from(byte)
    })
}

struct Transition {
    start: LightColorValues,
    started: Instant,
    length: Duration,
}

struct Values {
    current: LightColorValues,
    remote: LightColorValues,
    saved: Option<LightColorValues>,
    transition: Option<Transition>,
}

/// A controllable light.
pub struct LightState {
    name: String,
    object_id: String,
    object_id_hash: u32,
    internal: bool,
    traits: LightTraits,
    default_transition: Duration,
    values: Mutex<Values>,
    listeners: Mutex<Vec<(ListenerId, TargetStateReachedListener)>>,
    next_listener_id: AtomicU64,
}

impl LightState {
    /// Create a light that is off and has no transition by default.
    pub fn new(name: impl Into<String>, traits: LightTraits) -> Self {
        let name = name.into();
        let object_id = object_id_from_name(&name);
        let object_id_hash = fnv1_hash(&object_id);
        Self {
            name,
            object_id,
            object_id_hash,
            internal: false,
            traits,
            default_transition: Duration::ZERO,
            values: Mutex::new(Values {
                current: LightColorValues::default(),
                remote: LightColorValues::default(),
                saved: None,
                transition: None,
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Mark the light as internal (hidden from external notification paths).
    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Transition length used by calls that don't set one.
    pub fn with_default_transition(mut self, length: Duration) -> Self {
        self.default_transition = length;
        self
    }

    /// Start from the given values instead of the defaults.
    pub fn with_initial_values(self, initial: LightColorValues) -> Self {
        {
            let mut values = self.values.lock();
            values.current = initial;
            values.remote = initial;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Identity hash of this light, stable for a given name.
    pub fn object_id_hash(&self) -> u32 {
        self.object_id_hash
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn traits(&self) -> LightTraits {
        self.traits
    }

    pub fn default_transition(&self) -> Duration {
        self.default_transition
    }

    /// Values the light currently shows.
    pub fn current_values(&self) -> LightColorValues {
        self.values.lock().current
    }

    /// Values the light was last asked to reach.
    pub fn remote_values(&self) -> LightColorValues {
        self.values.lock().remote
    }

    /// Values recorded by the last call with `set_save(true)`.
    pub fn saved_values(&self) -> Option<LightColorValues> {
        self.values.lock().saved
    }

    pub fn is_transitioning(&self) -> bool {
        self.values.lock().transition.is_some()
    }

    /// Start an empty call.
    pub fn make_call(&self) -> LightCall<'_> {
        LightCall::new(self)
    }

    /// Start a call that switches the light on.
    pub fn turn_on(&self) -> LightCall<'_> {
        self.make_call().set_state(true)
    }

    /// Start a call that switches the light off.
    pub fn turn_off(&self) -> LightCall<'_> {
        self.make_call().set_state(false)
    }

    /// Subscribe to target-state-reached events.
    pub fn add_target_state_reached_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&LightState) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Unsubscribe. Returns `false` if the id was not subscribed.
    pub fn remove_target_state_reached_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Advance an active transition to `now`.
    ///
    /// Returns `true` if the transition completed (and listeners were fired).
    pub fn tick(&self, now: Instant) -> bool {
        let reached = {
            let mut values = self.values.lock();
            let Some((start, started, length)) = values
                .transition
                .as_ref()
                .map(|t| (t.start, t.started, t.length))
            else {
                return false;
            };
            let elapsed = now.saturating_duration_since(started);
            if elapsed >= length {
                values.current = values.remote;
                values.transition = None;
                true
            } else {
                let progress = elapsed.as_secs_f32() / length.as_secs_f32();
                values.current = LightColorValues::lerp(&start, &values.remote, progress);
                false
            }
        };

        if reached {
            self.fire_target_state_reached();
        }
        reached
    }

    pub(crate) fn apply(&self, target: LightColorValues, transition: Duration, save: bool) {
        let immediate = {
            let mut values = self.values.lock();
            values.remote = target;
            if save {
                values.saved = Some(target);
            }
            if transition.is_zero() || values.current == target {
                values.current = target;
                values.transition = None;
                true
            } else {
                values.transition = Some(Transition {
                    start: values.current,
                    started: Instant::now(),
                    length: transition,
                });
                false
            }
        };

        if immediate {
            self.fire_target_state_reached();
        }
    }

    fn fire_target_state_reached(&self) {
        let listeners: Vec<TargetStateReachedListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        debug!(
            "'{}': target state reached, notifying {} listener(s)",
            self.name,
            listeners.len()
        );
        for listener in listeners {
            listener(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_listener(light: &LightState) -> (ListenerId, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let id = light.add_target_state_reached_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (id, count)
    }

    #[test]
    fn test_object_id_and_hash() {
        let light = LightState::new("Living Room Lamp", LightTraits::on_off());
        assert_eq!(light.object_id(), "living_room_lamp");
        assert_eq!(light.object_id_hash(), fnv1_hash("living_room_lamp"));
        assert_eq!(fnv1_hash(""), 2_166_136_261);

        let same = LightState::new("Living Room Lamp", LightTraits::brightness());
        assert_eq!(light.object_id_hash(), same.object_id_hash());
    }

    #[test]
    fn test_immediate_call_fires_listener_once() {
        let light = LightState::new("Lamp", LightTraits::brightness());
        let (_, count) = counting_listener(&light);

        light.turn_on().perform();
        assert!(light.current_values().state);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transition_fires_on_completion() {
        let light = LightState::new("Lamp", LightTraits::brightness())
            .with_default_transition(Duration::from_secs(2));
        let (_, count) = counting_listener(&light);

        light.turn_on().set_brightness(0.8).perform();
        assert!(light.is_transitioning());
        assert!(!light.current_values().state);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let done = Instant::now() + Duration::from_secs(5);
        assert!(light.tick(done));
        assert!(!light.is_transitioning());
        assert_eq!(light.current_values().brightness, 0.8);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Nothing left to drive
        assert!(!light.tick(done));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_listener() {
        let light = LightState::new("Lamp", LightTraits::on_off());
        let (id, count) = counting_listener(&light);
        assert_eq!(light.listener_count(), 1);

        assert!(light.remove_target_state_reached_listener(id));
        assert!(!light.remove_target_state_reached_listener(id));
        assert_eq!(light.listener_count(), 0);

        light.turn_on().perform();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_reenter() {
        let light = Arc::new(LightState::new("Lamp", LightTraits::brightness()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        light.add_target_state_reached_listener(move |light| {
            let values = light.current_values();
            log.lock().push(values.brightness);
            // Dim back down once, from inside the callback
            if values.brightness > 0.5 {
                light.make_call().set_brightness(0.25).perform();
            }
        });

        light.make_call().set_brightness(0.9).perform();
        assert_eq!(*seen.lock(), vec![0.9, 0.25]);
        assert_eq!(light.current_values().brightness, 0.25);
    }

    #[test]
    fn test_internal_flag() {
        let light = LightState::new("Status LED", LightTraits::on_off()).with_internal(true);
        assert!(light.is_internal());
    }
}
