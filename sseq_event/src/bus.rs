// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed observer list.
//!
//! Components own an [`EventBus`] per event type instead of inheriting from
//! a shared emitter. Listeners are plain closures; they receive events by
//! reference and cannot reach back into the emitting component.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use sseq_event::bus::EventBus;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut bus = EventBus::new();
//!
//! let sink = Rc::clone(&seen);
//! let id = bus.subscribe(move |e: &u32| sink.borrow_mut().push(*e));
//! bus.emit(&7);
//! bus.unsubscribe(id);
//! bus.emit(&8);
//!
//! assert_eq!(*seen.borrow(), vec![7]);
//! ```

use core::fmt;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Ordered list of listeners for events of type `E`.
pub struct EventBus<E> {
    listeners: Vec<(SubscriptionId, Listener<E>)>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<E> EventBus<E> {
    /// Creates a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Adds a listener; listeners run in subscription order.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Delivers `event` to every listener.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::EventBus;

    #[test]
    fn listeners_run_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::<&'static str>::new();
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            bus.subscribe(move |e| log.borrow_mut().push(format!("{tag}:{e}")));
        }
        bus.emit(&"x");
        assert_eq!(*log.borrow(), vec!["a:x".to_string(), "b:x".to_string()]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut bus = EventBus::<()>::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.len(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
    }
}
