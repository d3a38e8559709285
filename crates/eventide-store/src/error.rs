//! Error types for the event store.

use crate::cursor::CursorState;

/// Errors returned by store and cursor operations.
///
/// These are contract violations by the caller, not transient conditions.
/// Nothing in the store retries or swallows them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// `current()` or `remove()` was called while the cursor was not
    /// positioned on an event.
    #[error("invalid cursor state: {operation} requires a positioned cursor, cursor is {state}")]
    InvalidCursorState {
        /// The rejected cursor operation.
        operation: &'static str,
        /// The state the cursor was in.
        state: CursorState,
    },
}
