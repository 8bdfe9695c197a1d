// src/events.rs

//! Typed publish/subscribe registry.
//!
//! Every event-emitting component (the project tree, the runner) owns an
//! [`EventRegistry`] for its own event type. Handlers are bound per event
//! *kind*; emitting an event calls every handler bound to its kind in the
//! order they were bound. Emitting an event nobody listens to is a no-op.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An event that can be routed by kind.
pub trait Event {
    /// Discriminant used to route the event to its handlers.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

type Handler<E> = Box<dyn FnMut(&E) + Send>;

/// Per-instance handler table for events of type `E`.
pub struct EventRegistry<E: Event> {
    handlers: HashMap<E::Kind, Vec<Handler<E>>>,
}

impl<E: Event> EventRegistry<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for events of the given kind.
    pub fn bind<F>(&mut self, kind: E::Kind, handler: F)
    where
        F: FnMut(&E) + Send + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Deliver `event` to every handler bound to its kind.
    pub fn emit(&mut self, event: &E) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Number of handlers bound to `kind`.
    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl<E: Event> Default for EventRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.len()))
            .collect();
        kinds.sort_by_key(|(kind, _)| format!("{kind:?}"));
        f.debug_struct("EventRegistry")
            .field("handlers", &kinds)
            .finish()
    }
}
