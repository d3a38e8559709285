//! Thread-safe, in-process store of typed, timestamped events.
//!
//! The store supports concurrent insertion, range queries by type, and bulk
//! deletion by type. Query results are consumed through a [`Cursor`], a
//! single-pass handle with explicit lookahead.
//!
//! # Architecture
//!
//! - [`set`] -- [`SharedSet`]: a hash set where every structural access is
//!   atomic on its own.
//! - [`cursor`] -- [`Cursor`]: forward-only traversal with `move_next`,
//!   `current`, `remove`, and a destructive release.
//! - [`store`] -- [`EventStore`]: `insert`, `remove_all`, and `query`.
//!
//! # Locking
//!
//! | Operation | Write lock | Set lock |
//! |-----------|-----------|----------|
//! | `insert` | whole call | one access |
//! | `remove_all` | whole call | per element |
//! | `query` | never | one scan |
//! | cursor `remove` / release | never | one access |
//!
//! # Release clears the source
//!
//! Dropping or closing a cursor empties the collection it was handed. For a
//! filtered query that is a private copy. For the wildcard query
//! (`query(None, 0, 0)`) it is the live store:
//!
//! ```
//! use eventide_store::EventStore;
//! use eventide_types::Event;
//!
//! let store = EventStore::new();
//! store.insert(Event::new("A", 1));
//! store.insert(Event::new("B", 1));
//!
//! let mut cursor = store.query(Some("A"), 0, 10);
//! assert!(cursor.move_next());
//! cursor.close();
//! assert_eq!(store.len(), 2);
//!
//! let cursor = store.query(None, 0, 0);
//! drop(cursor);
//! assert!(store.is_empty());
//! ```

pub mod cursor;
pub mod error;
pub mod set;
pub mod store;

// Re-export primary types at crate root.
pub use cursor::{Cursor, CursorState};
pub use error::StoreError;
pub use set::SharedSet;
pub use store::EventStore;
