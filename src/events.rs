//! Typed publish/subscribe used by sources, layers and the viewport.
//!
//! Each component owns an [`EventBus`] over its own event enum. Observers
//! (UI chrome, telemetry, tests) register closures with
//! [`EventBus::subscribe`] and are called synchronously, in subscription
//! order, every time the component emits.
//!
//! Some events are *fire-once*: a source only becomes ready once, a viewport
//! is only destroyed once. The bus enforces this itself. A fire-once kind is
//! delivered the first time it is emitted, later emits of the same kind are
//! dropped, and observers that subscribe after the fact receive the recorded
//! event immediately on subscription.

use std::collections::HashMap;
use std::fmt;
use std::mem::{discriminant, Discriminant};

use tracing::debug;

/// An event type that can travel over an [`EventBus`].
pub trait Event: fmt::Debug {
    /// Whether this event kind may be delivered at most once per bus.
    fn fires_once(&self) -> bool {
        false
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// Synchronous event dispatcher with fire-once support.
pub struct EventBus<E: Event> {
    /// Name used in log output
    name: &'static str,

    next_id: u64,

    handlers: Vec<(SubscriptionId, Handler<E>)>,

    /// Fire-once events that have already been delivered, by kind
    fired: HashMap<Discriminant<E>, E>,
}

impl<E: Event> EventBus<E> {
    /// Create an empty bus. `name` only appears in log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: 0,
            handlers: Vec::new(),
            fired: HashMap::new(),
        }
    }

    /// Register an observer.
    ///
    /// Fire-once events that were already emitted are replayed to the new
    /// observer before this returns.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let mut handler: Handler<E> = Box::new(handler);
        for event in self.fired.values() {
            handler(event);
        }
        self.handlers.push((id, handler));
        id
    }

    /// Remove an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _)| *sub != id);
        self.handlers.len() != before
    }

    /// Remove every observer.
    pub fn unsubscribe_all(&mut self) {
        self.handlers.clear();
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Whether a fire-once event of the same kind as `event` was delivered.
    pub fn has_fired(&self, event: &E) -> bool {
        self.fired.contains_key(&discriminant(event))
    }

    /// Deliver `event` to every observer.
    ///
    /// Returns `false` if the event was suppressed because its fire-once kind
    /// was already delivered.
    pub fn emit(&mut self, event: E) -> bool {
        let kind = discriminant(&event);
        if event.fires_once() && self.fired.contains_key(&kind) {
            debug!(bus = self.name, event = ?event, "Suppressed repeated fire-once event");
            return false;
        }

        for (_, handler) in self.handlers.iter_mut() {
            handler(&event);
        }

        if event.fires_once() {
            self.fired.insert(kind, event);
        }
        true
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.name)
            .field("subscribers", &self.handlers.len())
            .field("fired", &self.fired.len())
            .finish()
    }
}
