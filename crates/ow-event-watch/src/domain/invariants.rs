//! # Domain Invariants
//!
//! Rules that must hold for every watch session, written as plain functions
//! so tests (and debug assertions) can check them directly.

use super::entities::WatchMode;
use shared_types::{BlockHeight, RawEvent};
use std::collections::HashSet;

/// Invariant: a cursor never moves backwards.
#[must_use]
pub fn invariant_cursor_monotonic(old: BlockHeight, new: BlockHeight) -> bool {
    new >= old
}

/// Invariant: mode transitions are one-way.
///
/// `Starting → LiveAttempt → Live` or `→ Polling`; `Live → Polling` on
/// failure; `Stopped` from anywhere. Once a kind polls, it never goes back
/// to live within the same subscription lifetime.
#[must_use]
pub fn invariant_mode_transition(from: WatchMode, to: WatchMode) -> bool {
    use WatchMode::{Live, LiveAttempt, Polling, Starting, Stopped};
    matches!(
        (from, to),
        (Starting, LiveAttempt)
            | (LiveAttempt, Live)
            | (LiveAttempt, Polling)
            | (Live, Polling)
            | (_, Stopped)
    ) || from == to
}

/// Invariant: a delivered sequence contains no two events with the same
/// `(kind, block_height, source_index)`.
#[must_use]
pub fn invariant_unique_events(events: &[RawEvent]) -> bool {
    let mut seen = HashSet::new();
    events
        .iter()
        .all(|e| seen.insert((e.kind, e.block_height, e.source_index)))
}
