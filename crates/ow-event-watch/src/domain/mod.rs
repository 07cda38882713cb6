//! # Domain Layer
//!
//! Core state for the watch subsystem: cursors, per-kind subscription state,
//! errors, and checkable invariants.

pub mod entities;
pub mod errors;
pub mod invariants;

pub use entities::{Cursor, KindStatus, SubscriptionState, WatchMode};
pub use errors::WatchError;
pub use invariants::{invariant_cursor_monotonic, invariant_mode_transition, invariant_unique_events};
