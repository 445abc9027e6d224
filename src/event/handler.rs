//! Handler registry and the legacy propagation result.
//!
//! [`HandlerList`] stores callbacks under a key with stable [`HandlerId`]s.
//! During a call the callback is taken out of its slot, so a handler that
//! re-enters the dispatcher never observes itself, and a handler that
//! disconnects itself mid-call is simply not restored.

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Result of a legacy per-widget event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Let the event continue to the next widget.
    #[default]
    Proceed,
    /// The event is handled; stop propagation.
    Stop,
}

impl Propagation {
    /// Whether propagation stops here.
    pub fn is_stop(self) -> bool {
        self == Propagation::Stop
    }
}

impl From<bool> for Propagation {
    fn from(handled: bool) -> Self {
        if handled {
            Propagation::Stop
        } else {
            Propagation::Proceed
        }
    }
}

// ---------------------------------------------------------------------------
// HandlerList
// ---------------------------------------------------------------------------

/// Identifies a connected handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

#[derive(Debug)]
struct Entry<K, F> {
    id: HandlerId,
    key: K,
    callback: Option<F>,
}

/// Ordered callback storage keyed by `K`.
#[derive(Debug)]
pub struct HandlerList<K, F> {
    entries: Vec<Entry<K, F>>,
    next_id: u64,
}

impl<K: PartialEq + Copy, F> HandlerList<K, F> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a callback under `key`.
    pub fn add(&mut self, key: K, callback: F) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            key,
            callback: Some(callback),
        });
        id
    }

    /// Remove a handler. Returns `false` if `id` is unknown.
    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Ids registered under `key`, in connection order.
    pub fn ids_for(&self, key: K) -> Vec<HandlerId> {
        self.entries
            .iter()
            .filter(|e| e.key == key)
            .map(|e| e.id)
            .collect()
    }

    /// Take the callback out of its slot. `None` if the handler is gone or
    /// already running.
    pub fn take(&mut self, id: HandlerId) -> Option<F> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .and_then(|e| e.callback.take())
    }

    /// Put a taken callback back. Dropped if the handler was removed while
    /// it ran.
    pub fn restore(&mut self, id: HandlerId, callback: F) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.callback = Some(callback);
        }
    }

    /// Drop every handler whose key fails `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(K) -> bool) {
        self.entries.retain(|e| keep(e.key));
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: PartialEq + Copy, F> Default for HandlerList<K, F> {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
