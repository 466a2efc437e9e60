//! Sound bus: an owned publish/subscribe channel for noises.
//!
//! `emit` delivers synchronously, in registration order, to the listeners
//! registered when the emit started. A handler gets a [`BusControl`] so it
//! can unsubscribe itself or others, or subscribe new listeners, while the
//! emit is in progress:
//!
//! - a listener removed before its turn is skipped for the current emit;
//! - a listener removed after its turn has already received the event;
//! - a listener added during an emit first hears the next emit.
//!
//! Handlers cannot emit re-entrantly; the bus is borrowed for the duration
//! of the dispatch.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;

use casa_core::constants::MIN_COLLISION_FORCE;
use casa_core::events::SoundEvent;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&SoundEvent, &mut BusControl<'_>)>;

struct Listener {
    id: SubscriptionId,
    /// Taken out while the handler runs.
    handler: Option<Handler>,
    active: bool,
}

/// Publish/subscribe channel for [`SoundEvent`]s.
#[derive(Default)]
pub struct SoundBus {
    listeners: Vec<Listener>,
    next_id: u64,
}

/// Control handle passed to handlers during an emit.
pub struct BusControl<'a> {
    listeners: &'a mut Vec<Listener>,
    pending: &'a mut Vec<Listener>,
    next_id: &'a mut u64,
    current: SubscriptionId,
}

impl fmt::Debug for SoundBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl SoundBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It receives every later emit until unsubscribed.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SoundEvent, &mut BusControl<'_>) + 'static,
    {
        let id = allocate_id(&mut self.next_id);
        self.listeners.push(Listener {
            id,
            handler: Some(Box::new(handler)),
            active: true,
        });
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.active).count()
    }

    /// Deliver a sound to every listener. Returns how many handlers ran.
    pub fn emit(&mut self, position: Vec3, loud: bool) -> usize {
        self.emit_event(SoundEvent { position, loud })
    }

    /// A quiet noise (footstep, creaking floor).
    pub fn emit_soft(&mut self, position: Vec3) -> usize {
        self.emit(position, false)
    }

    /// A loud noise (dropped object, slammed door).
    pub fn emit_loud(&mut self, position: Vec3) -> usize {
        self.emit(position, true)
    }

    pub fn emit_event(&mut self, event: SoundEvent) -> usize {
        let mut pending = Vec::new();
        let mut delivered = 0;

        // Only listeners present at the start of the emit take part.
        let count = self.listeners.len();
        for i in 0..count {
            if !self.listeners[i].active {
                continue;
            }
            let Some(mut handler) = self.listeners[i].handler.take() else {
                continue;
            };
            let current = self.listeners[i].id;
            {
                let mut control = BusControl {
                    listeners: &mut self.listeners,
                    pending: &mut pending,
                    next_id: &mut self.next_id,
                    current,
                };
                handler(&event, &mut control);
            }
            delivered += 1;
            if self.listeners[i].active {
                self.listeners[i].handler = Some(handler);
            }
        }

        self.listeners.retain(|l| l.active);
        self.listeners.append(&mut pending);
        delivered
    }
}

impl BusControl<'_> {
    /// Id of the handler currently running.
    pub fn current(&self) -> SubscriptionId {
        self.current
    }

    /// Unsubscribe the running handler after it returns.
    pub fn unsubscribe_self(&mut self) {
        let id = self.current;
        self.unsubscribe(id);
    }

    /// Unsubscribe any listener. Takes effect immediately for the rest of
    /// the current emit.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(listener) = self.listeners.iter_mut().find(|l| l.id == id && l.active) {
            listener.active = false;
            return true;
        }
        let before = self.pending.len();
        self.pending.retain(|l| l.id != id);
        self.pending.len() != before
    }

    /// Subscribe a new listener; it hears the next emit, not this one.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SoundEvent, &mut BusControl<'_>) + 'static,
    {
        let id = allocate_id(self.next_id);
        self.pending.push(Listener {
            id,
            handler: Some(Box::new(handler)),
            active: true,
        });
        id
    }
}

fn allocate_id(next_id: &mut u64) -> SubscriptionId {
    let id = SubscriptionId(*next_id);
    *next_id += 1;
    id
}

/// Queue of heard sounds, filled by a bus subscription and drained by the
/// owner between ticks.
#[derive(Debug, Clone, Default)]
pub struct SoundInbox {
    queue: Rc<RefCell<VecDeque<SoundEvent>>>,
}

impl SoundInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe this inbox to a bus.
    pub fn subscribe(&self, bus: &mut SoundBus) -> SubscriptionId {
        let queue = Rc::clone(&self.queue);
        bus.subscribe(move |event, _| queue.borrow_mut().push_back(*event))
    }

    /// Take all queued sounds, oldest first.
    pub fn drain(&self) -> Vec<SoundEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

/// A prop that makes noise on demand or when it hits something hard enough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEmitter {
    pub position: Vec3,
    pub loud: bool,
    pub min_collision_force: f32,
}

impl SoundEmitter {
    pub fn new(position: Vec3, loud: bool) -> Self {
        Self {
            position,
            loud,
            min_collision_force: MIN_COLLISION_FORCE,
        }
    }

    pub fn emit(&self, bus: &mut SoundBus) -> usize {
        bus.emit(self.position, self.loud)
    }

    /// Emit if the impact is strong enough. Returns whether a sound was made.
    pub fn on_collision(&self, bus: &mut SoundBus, relative_speed: f32) -> bool {
        if relative_speed > self.min_collision_force {
            self.emit(bus);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &mut SoundBus, log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> SubscriptionId {
        let log = Rc::clone(log);
        bus.subscribe(move |_, _| log.borrow_mut().push(name))
    }

    #[test]
    fn test_emit_reaches_listeners_in_order() {
        let mut bus = SoundBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&mut bus, &log, "a");
        recorder(&mut bus, &log, "b");
        recorder(&mut bus, &log, "c");

        assert_eq!(bus.emit_soft(Vec3::ZERO), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_emit_without_listeners_is_lost() {
        let mut bus = SoundBus::new();
        assert_eq!(bus.emit_loud(Vec3::ONE), 0);

        let inbox = SoundInbox::new();
        inbox.subscribe(&mut bus);
        assert!(inbox.is_empty(), "earlier sounds are not replayed");
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = SoundBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&mut bus, &log, "a");
        recorder(&mut bus, &log, "b");

        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a), "second unsubscribe is a no-op");
        bus.emit_soft(Vec3::ZERO);
        assert_eq!(*log.borrow(), vec!["b"]);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let mut bus = SoundBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        bus.subscribe(move |_, ctl| {
            *counter.borrow_mut() += 1;
            ctl.unsubscribe_self();
        });

        bus.emit_soft(Vec3::ZERO);
        bus.emit_soft(Vec3::ZERO);
        assert_eq!(*hits.borrow(), 1, "one-shot listener heard only the first emit");
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_removal_before_turn_skips_listener() {
        let mut bus = SoundBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        // "b" is registered after "a", so its id is known once "a" exists.
        let victim = Rc::new(RefCell::new(None));
        let victim_ref = Rc::clone(&victim);
        let log_a = Rc::clone(&log);
        bus.subscribe(move |_, ctl| {
            log_a.borrow_mut().push("a");
            if let Some(id) = *victim_ref.borrow() {
                ctl.unsubscribe(id);
            }
        });
        let b = recorder(&mut bus, &log, "b");
        *victim.borrow_mut() = Some(b);

        bus.emit_soft(Vec3::ZERO);
        assert_eq!(*log.borrow(), vec!["a"], "b was removed before its turn");
    }

    #[test]
    fn test_removal_after_turn_already_delivered() {
        let mut bus = SoundBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&mut bus, &log, "a");

        let log_b = Rc::clone(&log);
        bus.subscribe(move |_, ctl| {
            log_b.borrow_mut().push("b");
            ctl.unsubscribe(a);
        });

        bus.emit_soft(Vec3::ZERO);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        bus.emit_soft(Vec3::ZERO);
        assert_eq!(*log.borrow(), vec!["a", "b", "b"], "a is gone from the next emit");
    }

    #[test]
    fn test_subscribe_during_emit_hears_next_emit() {
        let mut bus = SoundBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_outer = Rc::clone(&log);
        bus.subscribe(move |_, ctl| {
            log_outer.borrow_mut().push("outer");
            let log_inner = Rc::clone(&log_outer);
            ctl.subscribe(move |_, _| log_inner.borrow_mut().push("inner"));
            ctl.unsubscribe_self();
        });

        assert_eq!(bus.emit_soft(Vec3::ZERO), 1);
        assert_eq!(*log.borrow(), vec!["outer"]);
        assert_eq!(bus.emit_soft(Vec3::ZERO), 1);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_inbox_collects_and_drains() {
        let mut bus = SoundBus::new();
        let inbox = SoundInbox::new();
        let id = inbox.subscribe(&mut bus);

        bus.emit_soft(Vec3::new(1.0, 0.0, 0.0));
        bus.emit_loud(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(inbox.len(), 2);

        let heard = inbox.drain();
        assert_eq!(heard.len(), 2);
        assert!(!heard[0].loud);
        assert!(heard[1].loud);
        assert!(inbox.is_empty());

        bus.unsubscribe(id);
        bus.emit_soft(Vec3::ZERO);
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_emitter_collision_threshold() {
        let mut bus = SoundBus::new();
        let inbox = SoundInbox::new();
        inbox.subscribe(&mut bus);
        let vase = SoundEmitter::new(Vec3::new(0.0, 1.0, 0.0), true);

        assert!(!vase.on_collision(&mut bus, 1.0), "gentle bump stays silent");
        assert!(vase.on_collision(&mut bus, 5.0));
        let heard = inbox.drain();
        assert_eq!(heard.len(), 1);
        assert!(heard[0].loud);
        assert_eq!(heard[0].position, vase.position);
    }
}
