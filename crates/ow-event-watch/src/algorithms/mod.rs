//! # Algorithms
//!
//! Pure functions behind the polling path: event ordering, already-seen
//! filtering, and block-range arithmetic. No I/O here; the application layer
//! drives these against the ledger port.

pub mod lookback;
pub mod ordering;

pub use lookback::{initial_cursor_block, poll_range};
pub use ordering::{discard_processed, order_events};
