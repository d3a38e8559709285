//! The immutable event value.
//!
//! An [`Event`] has no identity field of its own. Two events with the same
//! type label and the same timestamp are the same event, which is what gives
//! the store its set semantics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable, typed, timestamped event.
///
/// Equality and hashing cover both fields. The timestamp unit is chosen by
/// the caller (milliseconds in the bundled harness); the store only compares
/// timestamps, it never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Type label. Not validated; an empty label is legal.
    #[serde(rename = "type")]
    event_type: String,
    /// Caller-defined timestamp.
    timestamp: i64,
}

impl Event {
    /// Create a new event.
    pub fn new(event_type: impl Into<String>, timestamp: i64) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
        }
    }

    /// The event's type label.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The event's timestamp.
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Whether this event has the given type and falls in the half-open
    /// range `[start, end)`.
    pub fn matches(&self, event_type: &str, start: i64, end: i64) -> bool {
        self.event_type == event_type && start <= self.timestamp && self.timestamp < end
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.event_type, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn equal_pairs_are_the_same_event() {
        let a = Event::new("Event-1", 123);
        let b = Event::new("Event-1".to_owned(), 123);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        assert!(set.insert(a));
        assert!(!set.insert(b));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn differing_type_or_timestamp_are_distinct() {
        let base = Event::new("Event-1", 123);
        assert_ne!(base, Event::new("Event-2", 123));
        assert_ne!(base, Event::new("Event-1", 124));
    }

    #[test]
    fn matches_is_start_inclusive_end_exclusive() {
        let event = Event::new("A", 5);
        assert!(event.matches("A", 5, 6));
        assert!(event.matches("A", 0, 6));
        assert!(!event.matches("A", 0, 5));
        assert!(!event.matches("B", 0, 6));
        // Inverted range never matches.
        assert!(!event.matches("A", 6, 0));
    }

    #[test]
    fn empty_type_label_is_accepted() {
        let event = Event::new("", 0);
        assert_eq!(event.event_type(), "");
        assert_eq!(event.timestamp(), 0);
    }

    #[test]
    fn display_format() {
        assert_eq!(Event::new("Event-3", -7).to_string(), "Event-3@-7");
    }

    #[test]
    fn serializes_type_field_name() {
        let json = serde_json::to_value(Event::new("A", 1)).unwrap_or_default();
        assert_eq!(json["type"], "A");
        assert_eq!(json["timestamp"], 1);

        let back: Result<Event, _> = serde_json::from_value(json);
        assert_eq!(back.ok(), Some(Event::new("A", 1)));
    }
}
