//! Listener registration on an event source
//!
//! `EventTarget` plays the role of the document-level node a UI host
//! dispatches key-down events to. `on`/`off` are the attach/detach helpers
//! used by scoped registrations.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

/// Callback invoked for every event dispatched to a target
pub type Listener<E> = Arc<dyn Fn(&mut E) + Send + Sync>;

/// Handle returned by [`EventTarget::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

struct Registry<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, Listener<E>)>>,
}

/// Ordered set of listeners. Clones share the same set.
pub struct EventTarget<E> {
    inner: Arc<Registry<E>>,
}

impl<E> Clone for EventTarget<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventTarget<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventTarget<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<E> EventTarget<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Registry {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener<E>)>> {
        // A panicking listener never runs under the lock, so the list is
        // still consistent after poisoning.
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a listener; it runs after every listener already registered
    pub fn add_listener(&self, listener: Listener<E>) -> ListenerId {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners().push((id, listener));
        trace!(%id, "listener added");
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;
        trace!(%id, removed, "listener removed");
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    /// Deliver `event` to every listener in registration order.
    ///
    /// Listeners run against a snapshot taken before the first one is
    /// called, so they may add or remove listeners freely.
    pub fn dispatch(&self, event: &mut E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(&mut *event);
        }
    }
}

/// Attach `listener` to `target`
pub fn on<E>(target: &EventTarget<E>, listener: Listener<E>) -> ListenerId {
    target.add_listener(listener)
}

/// Detach a listener previously attached with [`on`]
pub fn off<E>(target: &EventTarget<E>, id: ListenerId) {
    target.remove_listener(id);
}
