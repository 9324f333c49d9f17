//! Collision event dispatch following Game Engine Architecture Ch 16.8
//!
//! Key principles:
//! - Registration system (only notify interested handlers)
//! - Per-body hooks live in a side table keyed by body id, never inside the
//!   collider, so dispatch never needs to reach back into the system
//! - Immediate delivery: everything queued during a tick is dispatched before
//!   `update()` returns

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::physics::{BodyId, CollisionResult};

/// Whether a pair is resolved physically or only reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    /// Physical contact, resolved by the system
    Collision,
    /// Overlap report only
    Trigger,
}

/// Where in its lifetime a pair's overlap is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    /// First tick of an overlap
    Enter,
    /// Overlap continues from the previous tick
    Stay,
    /// Overlap ended (or one body was removed)
    Exit,
}

/// Event delivered to hooks and subscribers
pub struct CollisionEvent<'a, U> {
    /// Collision or trigger
    pub kind: ContactKind,
    /// Enter, stay or exit
    pub phase: ContactPhase,
    /// Most recent contact data for the pair
    pub result: &'a CollisionResult,
    /// Payload of `result.body_a`
    pub user_data_a: &'a U,
    /// Payload of `result.body_b`
    pub user_data_b: &'a U,
}

impl<'a, U> CollisionEvent<'a, U> {
    /// True if `id` is one of the two bodies
    pub fn involves(&self, id: BodyId) -> bool {
        self.result.body_a == id || self.result.body_b == id
    }

    /// The partner of `id` in this pair
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if self.result.body_a == id {
            Some(self.result.body_b)
        } else if self.result.body_b == id {
            Some(self.result.body_a)
        } else {
            None
        }
    }

    /// Payload of one of the two bodies
    pub fn user_data_of(&self, id: BodyId) -> Option<&'a U> {
        if self.result.body_a == id {
            Some(self.user_data_a)
        } else if self.result.body_b == id {
            Some(self.user_data_b)
        } else {
            None
        }
    }
}

/// Boxed event callback
pub type EventCallback<U> = Box<dyn FnMut(&CollisionEvent<'_, U>)>;

/// Optional per-body callbacks, one per kind and phase
pub struct ColliderHooks<U = ()> {
    collision_enter: Option<EventCallback<U>>,
    collision_stay: Option<EventCallback<U>>,
    collision_exit: Option<EventCallback<U>>,
    trigger_enter: Option<EventCallback<U>>,
    trigger_stay: Option<EventCallback<U>>,
    trigger_exit: Option<EventCallback<U>>,
}

impl<U> Default for ColliderHooks<U> {
    fn default() -> Self {
        Self {
            collision_enter: None,
            collision_stay: None,
            collision_exit: None,
            trigger_enter: None,
            trigger_stay: None,
            trigger_exit: None,
        }
    }
}

impl<U> ColliderHooks<U> {
    /// No hooks set
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on the first tick of a physical contact
    pub fn on_collision_enter(mut self, f: impl FnMut(&CollisionEvent<'_, U>) + 'static) -> Self {
        self.collision_enter = Some(Box::new(f));
        self
    }

    /// Called every later tick of a physical contact
    pub fn on_collision_stay(mut self, f: impl FnMut(&CollisionEvent<'_, U>) + 'static) -> Self {
        self.collision_stay = Some(Box::new(f));
        self
    }

    /// Called when a physical contact ends
    pub fn on_collision_exit(mut self, f: impl FnMut(&CollisionEvent<'_, U>) + 'static) -> Self {
        self.collision_exit = Some(Box::new(f));
        self
    }

    /// Called on the first tick of a trigger overlap
    pub fn on_trigger_enter(mut self, f: impl FnMut(&CollisionEvent<'_, U>) + 'static) -> Self {
        self.trigger_enter = Some(Box::new(f));
        self
    }

    /// Called every later tick of a trigger overlap
    pub fn on_trigger_stay(mut self, f: impl FnMut(&CollisionEvent<'_, U>) + 'static) -> Self {
        self.trigger_stay = Some(Box::new(f));
        self
    }

    /// Called when a trigger overlap ends
    pub fn on_trigger_exit(mut self, f: impl FnMut(&CollisionEvent<'_, U>) + 'static) -> Self {
        self.trigger_exit = Some(Box::new(f));
        self
    }

    fn slot(&mut self, kind: ContactKind, phase: ContactPhase) -> &mut Option<EventCallback<U>> {
        match (kind, phase) {
            (ContactKind::Collision, ContactPhase::Enter) => &mut self.collision_enter,
            (ContactKind::Collision, ContactPhase::Stay) => &mut self.collision_stay,
            (ContactKind::Collision, ContactPhase::Exit) => &mut self.collision_exit,
            (ContactKind::Trigger, ContactPhase::Enter) => &mut self.trigger_enter,
            (ContactKind::Trigger, ContactPhase::Stay) => &mut self.trigger_stay,
            (ContactKind::Trigger, ContactPhase::Exit) => &mut self.trigger_exit,
        }
    }

    fn fire(&mut self, event: &CollisionEvent<'_, U>) {
        if let Some(callback) = self.slot(event.kind, event.phase) {
            callback(event);
        }
    }
}

new_key_type! {
    /// Handle returned by `on_collision` / `on_trigger`, used to unsubscribe
    pub struct SubscriptionHandle;
}

struct Subscriber<U> {
    kind: ContactKind,
    callback: EventCallback<U>,
}

/// Hook side table plus system-wide subscribers
pub(crate) struct EventDispatcher<U> {
    hooks: HashMap<BodyId, ColliderHooks<U>>,
    subscribers: SlotMap<SubscriptionHandle, Subscriber<U>>,
}

impl<U> EventDispatcher<U> {
    pub(crate) fn new() -> Self {
        Self {
            hooks: HashMap::new(),
            subscribers: SlotMap::with_key(),
        }
    }

    /// Register a system-wide handler for one kind of contact
    pub(crate) fn subscribe(&mut self, kind: ContactKind, callback: EventCallback<U>) -> SubscriptionHandle {
        self.subscribers.insert(Subscriber { kind, callback })
    }

    pub(crate) fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.subscribers.remove(handle).is_some()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn set_hooks(&mut self, id: BodyId, hooks: ColliderHooks<U>) {
        self.hooks.insert(id, hooks);
    }

    pub(crate) fn remove_hooks(&mut self, id: BodyId) -> bool {
        self.hooks.remove(&id).is_some()
    }

    pub(crate) fn clear_hooks(&mut self) {
        self.hooks.clear();
    }

    /// Deliver one event: body A's hook, body B's hook, then subscribers
    pub(crate) fn dispatch(&mut self, event: &CollisionEvent<'_, U>) {
        for id in [event.result.body_a, event.result.body_b] {
            if let Some(hooks) = self.hooks.get_mut(&id) {
                hooks.fire(event);
            }
        }

        for subscriber in self.subscribers.values_mut() {
            if subscriber.kind == event.kind {
                (subscriber.callback)(event);
            }
        }
    }
}
