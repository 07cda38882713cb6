//! # Event Ordering and Deduplication
//!
//! A range query returns events in whatever order the node stored them.
//! Delivery order is `(block_height, source_index)` ascending, enforced
//! here rather than trusted from the node.

use shared_types::{BlockHeight, RawEvent};

/// Sort events by `(block_height, source_index)` ascending.
///
/// The sort is stable, so events an eccentric node reports with identical
/// attribution keep their arrival order.
pub fn order_events(events: &mut [RawEvent]) {
    events.sort_by_key(RawEvent::ordering_key);
}

/// Drop events at or below the cursor block.
///
/// The poll range is inclusive at the cursor block, so rows already
/// processed in a previous cycle (or delivered live before a degrade) come
/// back; this filter is what makes redelivery impossible.
#[must_use]
pub fn discard_processed(events: Vec<RawEvent>, cursor_block: BlockHeight) -> Vec<RawEvent> {
    events
        .into_iter()
        .filter(|e| e.block_height > cursor_block)
        .collect()
}
