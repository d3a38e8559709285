//! Single-pass cursor over a set of events.
//!
//! A [`Cursor`] separates "is there another element" ([`Cursor::move_next`])
//! from "give me the element" ([`Cursor::current`]). The same type serves
//! destructive traversal (bulk removal inside the store) and read traversal
//! (query results handed to callers).
//!
//! # States
//!
//! ```text
//!            move_next: true               remove
//!   Fresh ─────────────────▶ Positioned ─────────▶ Removed
//!     │                        ▲    │                 │
//!     │                        └────┘ move_next: true │
//!     │                        ◀──────────────────────┘
//!     │ move_next: false                 move_next: false
//!     └──────────────────────▶ Exhausted ◀────────────
//! ```
//!
//! `current` and `remove` are only valid in `Positioned`.
//!
//! # Release
//!
//! Closing or dropping a cursor clears its whole backing collection, even
//! the elements it never visited. When the backing collection is the live
//! store (wildcard query) the store is emptied.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use eventide_types::Event;
use tracing::debug;

use crate::error::StoreError;
use crate::set::SharedSet;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Observable cursor state, reported in [`StoreError::InvalidCursorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Constructed; `move_next` has not been called.
    Fresh,
    /// The last `move_next` returned true.
    Positioned,
    /// The positioned element was removed; `move_next` is required next.
    Removed,
    /// `move_next` found no further element.
    Exhausted,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fresh => "fresh",
            Self::Positioned => "positioned",
            Self::Removed => "removed",
            Self::Exhausted => "exhausted",
        };
        f.write_str(label)
    }
}

/// Traversal position. Indices point into the cursor's visit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Fresh,
    At(usize),
    Removed(usize),
    Exhausted,
}

// ---------------------------------------------------------------------------
// Backing collection
// ---------------------------------------------------------------------------

/// The collection a cursor was handed.
#[derive(Debug)]
enum Backing {
    /// The store's own set. Removals and release hit the store.
    Live(Arc<SharedSet>),
    /// A result set owned by this cursor alone.
    Detached(HashSet<Event>),
}

impl Backing {
    fn contains(&self, event: &Event) -> bool {
        match self {
            Self::Live(set) => set.contains(event),
            Self::Detached(set) => set.contains(event),
        }
    }

    fn remove(&mut self, event: &Event) -> bool {
        match self {
            Self::Live(set) => set.remove(event),
            Self::Detached(set) => set.remove(event),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Live(set) => set.len(),
            Self::Detached(set) => set.len(),
        }
    }

    fn clear(&mut self) -> usize {
        match self {
            Self::Live(set) => set.clear(),
            Self::Detached(set) => {
                let count = set.len();
                set.clear();
                count
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Forward-only, single-use traversal handle.
///
/// The visit order is fixed when the cursor is built. A live cursor skips
/// elements that left the store before it reached them. An element removed
/// elsewhere after `move_next` positioned on it is still returned by
/// `current`; `remove` then reports that nothing was removed. Events
/// inserted after the cursor was built are not visited.
///
/// A cursor carries no synchronization of its own; drive it from the
/// thread that owns it.
#[derive(Debug)]
pub struct Cursor {
    /// `None` once released or disarmed.
    backing: Option<Backing>,
    /// Elements in visit order.
    order: Vec<Event>,
    position: Position,
}

impl Cursor {
    /// Cursor over the store's live set.
    pub(crate) fn live(set: Arc<SharedSet>) -> Self {
        let order = set.snapshot();
        Self {
            backing: Some(Backing::Live(set)),
            order,
            position: Position::Fresh,
        }
    }

    /// Cursor that takes ownership of a result set.
    pub fn detached(events: HashSet<Event>) -> Self {
        let order = events.iter().cloned().collect();
        Self {
            backing: Some(Backing::Detached(events)),
            order,
            position: Position::Fresh,
        }
    }

    /// Whether this cursor mutates the store it came from.
    pub const fn is_live(&self) -> bool {
        matches!(self.backing, Some(Backing::Live(_)))
    }

    /// Current state of the cursor.
    pub const fn state(&self) -> CursorState {
        match self.position {
            Position::Fresh => CursorState::Fresh,
            Position::At(_) => CursorState::Positioned,
            Position::Removed(_) => CursorState::Removed,
            Position::Exhausted => CursorState::Exhausted,
        }
    }

    /// Number of events currently in the backing collection.
    pub fn backing_len(&self) -> usize {
        self.backing.as_ref().map_or(0, Backing::len)
    }

    /// Advance to the next available event.
    ///
    /// Returns `true` and positions the cursor if one exists. Returns
    /// `false` once the traversal is done, and keeps returning `false`.
    pub fn move_next(&mut self) -> bool {
        let mut next = match self.position {
            Position::Fresh => 0,
            Position::At(i) | Position::Removed(i) => i.saturating_add(1),
            Position::Exhausted => return false,
        };

        while let Some(event) = self.order.get(next) {
            if self.backing.as_ref().is_some_and(|b| b.contains(event)) {
                self.position = Position::At(next);
                return true;
            }
            next = next.saturating_add(1);
        }

        self.position = Position::Exhausted;
        false
    }

    /// The event the cursor is positioned on.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCursorState`] unless the last
    /// `move_next` returned `true` and nothing was removed since.
    pub fn current(&self) -> Result<&Event, StoreError> {
        match self.position {
            Position::At(i) => self.order.get(i).ok_or_else(|| self.invalid("current")),
            _ => Err(self.invalid("current")),
        }
    }

    /// Remove the positioned event from the backing collection.
    ///
    /// For a live cursor this removes the event from the store. The cursor
    /// then needs a `move_next` before `current` or `remove` are valid again.
    ///
    /// Returns `false` if the event had already left the backing collection,
    /// e.g. another cursor over the live store removed it first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCursorState`] unless the cursor is
    /// positioned.
    pub fn remove(&mut self) -> Result<bool, StoreError> {
        let Position::At(i) = self.position else {
            return Err(self.invalid("remove"));
        };
        let event = self.order.get(i).ok_or_else(|| self.invalid("remove"))?;
        let removed = self
            .backing
            .as_mut()
            .is_some_and(|backing| backing.remove(event));
        self.position = Position::Removed(i);
        Ok(removed)
    }

    /// Release the cursor, clearing its backing collection.
    ///
    /// Equivalent to dropping it.
    pub fn close(mut self) {
        self.release();
    }

    /// Release the cursor without touching its backing collection.
    pub(crate) fn disarm(mut self) {
        self.backing = None;
    }

    fn release(&mut self) {
        if let Some(mut backing) = self.backing.take() {
            let live = matches!(backing, Backing::Live(_));
            let cleared = backing.clear();
            debug!(live, cleared, "cursor released, backing collection cleared");
        }
    }

    const fn invalid(&self, operation: &'static str) -> StoreError {
        StoreError::InvalidCursorState {
            operation,
            state: self.state(),
        }
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(count: i64) -> HashSet<Event> {
        (0..count).map(|t| Event::new(format!("Event-{}", t % 3), t)).collect()
    }

    fn assert_invalid<T>(result: Result<T, StoreError>, state: CursorState) {
        assert!(matches!(
            result,
            Err(StoreError::InvalidCursorState { state: s, .. }) if s == state
        ));
    }

    #[test]
    fn move_next_on_empty_set() {
        let mut cursor = Cursor::detached(HashSet::new());
        assert!(!cursor.move_next());
        assert_eq!(cursor.state(), CursorState::Exhausted);
        assert!(!cursor.move_next());
    }

    #[test]
    fn move_next_on_single_event() {
        let mut cursor = Cursor::detached(events(1));
        assert!(cursor.move_next());
        assert_eq!(cursor.state(), CursorState::Positioned);
        assert!(!cursor.move_next());
    }

    #[test]
    fn visits_every_event_once() {
        let source = events(500);
        let mut cursor = Cursor::detached(source.clone());
        let mut seen = HashSet::new();
        while cursor.move_next() {
            let event = cursor.current().cloned();
            assert!(event.is_ok());
            assert!(seen.insert(event.unwrap_or_else(|_| Event::new("", -1))));
        }
        assert_eq!(seen, source);
    }

    #[test]
    fn current_before_move_next_is_invalid() {
        let cursor = Cursor::detached(events(3));
        assert_invalid(cursor.current(), CursorState::Fresh);
    }

    #[test]
    fn current_after_exhaustion_is_invalid() {
        let mut cursor = Cursor::detached(events(1));
        while cursor.move_next() {}
        assert_invalid(cursor.current(), CursorState::Exhausted);
    }

    #[test]
    fn current_does_not_advance() {
        let mut cursor = Cursor::detached(events(2));
        assert!(cursor.move_next());
        let first = cursor.current().cloned().ok();
        let again = cursor.current().cloned().ok();
        assert!(first.is_some());
        assert_eq!(first, again);
    }

    #[test]
    fn remove_on_empty_set_is_invalid() {
        let mut cursor = Cursor::detached(HashSet::new());
        assert_invalid(cursor.remove(), CursorState::Fresh);
        assert!(!cursor.move_next());
        assert_invalid(cursor.remove(), CursorState::Exhausted);
    }

    #[test]
    fn remove_before_move_next_is_invalid() {
        let mut cursor = Cursor::detached(events(1));
        assert_invalid(cursor.remove(), CursorState::Fresh);
        assert_eq!(cursor.backing_len(), 1);
    }

    #[test]
    fn remove_every_event() {
        let mut cursor = Cursor::detached(events(1));
        while cursor.move_next() {
            assert!(cursor.current().is_ok());
            assert!(cursor.remove().is_ok());
        }
        assert_eq!(cursor.backing_len(), 0);
    }

    #[test]
    fn remove_one_of_two() {
        let mut cursor = Cursor::detached(events(2));
        assert!(cursor.move_next());
        assert_eq!(cursor.remove(), Ok(true));
        assert_eq!(cursor.backing_len(), 1);
    }

    #[test]
    fn remove_requires_fresh_move_next() {
        let mut cursor = Cursor::detached(events(2));
        assert!(cursor.move_next());
        assert!(cursor.remove().is_ok());
        assert_eq!(cursor.state(), CursorState::Removed);

        assert_invalid(cursor.current(), CursorState::Removed);
        assert_invalid(cursor.remove(), CursorState::Removed);

        assert!(cursor.move_next());
        assert!(cursor.current().is_ok());
        assert!(!cursor.move_next());
    }

    #[test]
    fn live_cursor_mutates_and_clears_source() {
        let set = Arc::new(SharedSet::from_set(events(6)));
        let mut cursor = Cursor::live(Arc::clone(&set));
        assert!(cursor.is_live());

        assert!(cursor.move_next());
        assert!(cursor.remove().is_ok());
        assert_eq!(set.len(), 5);

        cursor.close();
        assert!(set.is_empty());
    }

    #[test]
    fn live_cursor_skips_events_removed_elsewhere() {
        let set = Arc::new(SharedSet::from_set(events(10)));
        let mut cursor = Cursor::live(Arc::clone(&set));
        for t in 0..10 {
            if t % 2 == 0 {
                set.remove(&Event::new(format!("Event-{}", t % 3), t));
            }
        }

        let mut visited = 0;
        while cursor.move_next() {
            let odd = cursor.current().is_ok_and(|e| e.timestamp() % 2 == 1);
            assert!(odd);
            visited += 1;
        }
        assert_eq!(visited, 5);
        cursor.disarm();
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn remove_reports_event_already_gone() {
        let set = Arc::new(SharedSet::from_set(HashSet::from([Event::new("A", 1)])));
        let mut cursor = Cursor::live(Arc::clone(&set));
        assert!(cursor.move_next());

        assert!(set.remove(&Event::new("A", 1)));
        assert_eq!(cursor.current(), Ok(&Event::new("A", 1)));
        assert_eq!(cursor.remove(), Ok(false));
        assert_eq!(cursor.state(), CursorState::Removed);
        assert!(!cursor.move_next());
        cursor.disarm();
    }

    #[test]
    fn drop_clears_unconsumed_events() {
        let set = Arc::new(SharedSet::from_set(events(3)));
        {
            let mut cursor = Cursor::live(Arc::clone(&set));
            assert!(cursor.move_next());
        }
        assert!(set.is_empty());
    }

    #[test]
    fn error_message_names_operation_and_state() {
        let cursor = Cursor::detached(HashSet::new());
        let message = cursor.current().map(|_| ()).err().map(|e| e.to_string());
        assert_eq!(
            message.as_deref(),
            Some("invalid cursor state: current requires a positioned cursor, cursor is fresh")
        );
    }
}
