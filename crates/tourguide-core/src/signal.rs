//! Notification signals.
//!
//! A `Signal` holds listeners that run when the owner emits an event.
//! Listeners decide for themselves whether they stay connected, which lets
//! one-shot subscriptions clean up without any unsubscribe bookkeeping.
//! Listeners must not re-enter the object that owns the signal.

use std::fmt;

/// Returned by a listener to say whether it wants further events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listen {
    /// Keep the listener connected.
    Keep,
    /// Disconnect the listener.
    Disconnect,
}

type Listener<E> = Box<dyn FnMut(&E) -> Listen>;

/// A list of listeners for events of type `E`.
pub struct Signal<E> {
    listeners: Vec<Listener<E>>,
}

impl<E> Signal<E> {
    /// Creates a signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Connects a listener that stays until it returns `Listen::Disconnect`.
    pub fn connect(&mut self, listener: impl FnMut(&E) -> Listen + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Connects a listener that runs for the next event only.
    pub fn connect_once(&mut self, listener: impl FnOnce(&E) + 'static) {
        let mut slot = Some(listener);
        self.connect(move |event| {
            if let Some(listener) = slot.take() {
                listener(event);
            }
            Listen::Disconnect
        });
    }

    /// Delivers `event` to every listener in connection order.
    pub fn emit(&mut self, event: &E) {
        self.listeners
            .retain_mut(|listener| listener(event) == Listen::Keep);
    }

    /// Number of connected listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
