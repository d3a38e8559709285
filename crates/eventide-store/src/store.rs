//! The event store: insert, bulk removal by type, and range queries.
//!
//! [`EventStore`] is a cheap, cloneable handle. Clones share the same
//! events, so a single store can be handed to any number of threads.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use eventide_types::Event;
use tracing::{debug, trace, warn};

use crate::cursor::Cursor;
use crate::set::SharedSet;

/// Thread-safe set of unique events.
///
/// `insert` and `remove_all` are serialized on a write lock, so each runs
/// as one atomic operation with respect to the other. `query` never takes
/// the write lock; it sees the set at per-access granularity.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    /// Serializes mutating operations.
    write_lock: Arc<Mutex<()>>,
    /// The canonical collection.
    events: Arc<SharedSet>,
}

impl EventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `events`. Duplicates collapse.
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Event>,
    {
        Self {
            write_lock: Arc::default(),
            events: Arc::new(SharedSet::from_set(events.into_iter().collect())),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| {
            warn!("store write lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Store an event.
    ///
    /// Returns `false` if an equal event was already stored, in which case
    /// the store is unchanged.
    pub fn insert(&self, event: Event) -> bool {
        let _writes = self.lock_writes();
        let added = self.events.insert(event);
        trace!(added, "insert");
        added
    }

    /// Remove every event whose type equals `event_type` exactly.
    ///
    /// Holds the write lock for the whole pass, so no insert interleaves
    /// with it. Returns the number of events this call removed; events a
    /// wildcard cursor removes concurrently are not counted.
    pub fn remove_all(&self, event_type: &str) -> usize {
        let _writes = self.lock_writes();

        let mut cursor = Cursor::live(Arc::clone(&self.events));
        let mut removed: usize = 0;
        while cursor.move_next() {
            let matched = cursor
                .current()
                .is_ok_and(|event| event.event_type() == event_type);
            if matched && matches!(cursor.remove(), Ok(true)) {
                removed = removed.saturating_add(1);
            }
        }
        // The pass must not clear the store on the way out.
        cursor.disarm();

        debug!(event_type, removed, "remove_all");
        removed
    }

    /// Query events by type and timestamp range.
    ///
    /// With `event_type` absent or empty and `start == end == 0`, returns a
    /// live cursor over the whole store: nothing is filtered, and removing
    /// through or releasing that cursor mutates the store. The cursor does
    /// take a snapshot of the membership to fix its visit order; it walks
    /// that snapshot, skipping events that have since left the store, and
    /// does not visit events inserted after the query.
    ///
    /// Otherwise returns a cursor over a new set holding every event with
    /// the given type and `start <= timestamp < end`. That cursor never
    /// affects the store. An inverted range yields an empty result; an
    /// absent type with a non-zero range matches nothing.
    pub fn query(&self, event_type: Option<&str>, start: i64, end: i64) -> Cursor {
        let wildcard = event_type.is_none_or(str::is_empty) && start == 0 && end == 0;
        if wildcard {
            debug!("query: wildcard, live cursor");
            return Cursor::live(Arc::clone(&self.events));
        }

        let matches = event_type.map_or_else(HashSet::new, |wanted| {
            self.events.filtered(|event| event.matches(wanted, start, end))
        });
        debug!(
            event_type,
            start,
            end,
            matched = matches.len(),
            "query: filtered copy"
        );
        Cursor::detached(matches)
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether an equal event is stored.
    pub fn contains(&self, event: &Event) -> bool {
        self.events.contains(event)
    }
}

impl FromIterator<Event> for EventStore {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::from_events(iter)
    }
}
