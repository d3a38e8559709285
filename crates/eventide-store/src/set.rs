//! An internally synchronized set of events.
//!
//! Each method on [`SharedSet`] takes the mutex for exactly one structural
//! access. A sequence of calls is not atomic as a whole; callers that need
//! whole-operation atomicity serialize on their own lock.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use eventide_types::Event;
use tracing::warn;

/// A hash set of events behind a mutex.
#[derive(Debug, Default)]
pub struct SharedSet {
    /// The events. Only reachable through [`SharedSet::lock`].
    events: Mutex<HashSet<Event>>,
}

impl SharedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding the given events.
    pub fn from_set(events: HashSet<Event>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    /// Acquire the set. A poisoned mutex is recovered: the set holds plain
    /// values and every mutation is a single `HashSet` call, so it cannot
    /// be left half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<Event>> {
        self.events.lock().unwrap_or_else(|poisoned| {
            warn!("event set mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Add an event. Returns `false` if an equal event was already present.
    pub fn insert(&self, event: Event) -> bool {
        self.lock().insert(event)
    }

    /// Remove an event. Returns `false` if it was not present.
    pub fn remove(&self, event: &Event) -> bool {
        self.lock().remove(event)
    }

    /// Whether an equal event is present.
    pub fn contains(&self, event: &Event) -> bool {
        self.lock().contains(event)
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every event, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut events = self.lock();
        let count = events.len();
        events.clear();
        count
    }

    /// Copy out every event, in the set's iteration order.
    pub fn snapshot(&self) -> Vec<Event> {
        self.lock().iter().cloned().collect()
    }

    /// Copy out every event accepted by `keep` into a new, independent set.
    pub fn filtered<F>(&self, keep: F) -> HashSet<Event>
    where
        F: Fn(&Event) -> bool,
    {
        self.lock().iter().filter(|e| keep(e)).cloned().collect()
    }
}
