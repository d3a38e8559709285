//! Shared type definitions for the Eventide store.
//!
//! The only value the store deals in is the [`Event`]: a type label paired
//! with a timestamp. Both the store crate and the workload harness depend on
//! this crate so that neither owns the other's vocabulary.

pub mod event;

// Re-export primary types at crate root.
pub use event::Event;
