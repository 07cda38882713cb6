//! # Polling Fallback
//!
//! Pull-based recovery of events for kinds without a working live
//! subscription. One call covers one cycle: read the tip, query the open
//! range, filter what the cursor already covers, sort, and report the new
//! cursor position.

use crate::algorithms::{discard_processed, order_events, poll_range};
use crate::domain::Cursor;
use crate::ports::outbound::LedgerConnection;
use shared_types::{BlockHeight, EventKind, LedgerError, RawEvent};
use std::sync::Arc;
use tracing::debug;

/// Result of one poll cycle.
#[derive(Debug)]
pub struct PollOutcome {
    /// Events to deliver, ordered by `(block_height, source_index)`.
    pub events: Vec<RawEvent>,
    /// Cursor position after this cycle is fully delivered.
    pub cursor_block: BlockHeight,
}

/// Range-polling driver for one ledger connection.
pub struct PollingFallback {
    client: Arc<dyn LedgerConnection>,
}

impl PollingFallback {
    /// Create a poller over `client`.
    #[must_use]
    pub fn new(client: Arc<dyn LedgerConnection>) -> Self {
        Self { client }
    }

    /// Run one poll cycle for `kind`.
    ///
    /// A failure leaves the cursor untouched; the caller retries the same
    /// range on the next cycle. The cursor itself is never mutated here —
    /// the coordinator advances it only after the sink has seen everything.
    pub async fn poll(
        &self,
        kind: EventKind,
        cursor: &Cursor,
    ) -> Result<PollOutcome, LedgerError> {
        let height = self.client.current_block_height().await?;

        let Some((from, to)) = poll_range(cursor.last_processed_block(), height) else {
            debug!(kind = %kind, height, "Chain has not advanced, poll is a no-op");
            return Ok(PollOutcome {
                events: Vec::new(),
                cursor_block: cursor.last_processed_block(),
            });
        };

        let fetched = self.client.query_past_events(kind, from, to).await?;
        let fetched_count = fetched.len();

        let mut events = discard_processed(fetched, cursor.last_processed_block());
        order_events(&mut events);

        debug!(
            kind = %kind,
            from,
            to,
            fetched = fetched_count,
            fresh = events.len(),
            "Poll cycle complete"
        );

        Ok(PollOutcome {
            events,
            cursor_block: to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_node::MemoryLedgerNode;
    use shared_types::{AccountId, EventPayload, InfectionReport, Location};

    fn infection() -> EventPayload {
        EventPayload::Infection(InfectionReport {
            address: AccountId("0xabc".into()),
            location: Location("0,0".into()),
            observed_at: 0,
        })
    }

    #[tokio::test]
    async fn test_noop_when_chain_has_not_advanced() {
        let node = Arc::new(MemoryLedgerNode::new(100));
        let poller = PollingFallback::new(node);
        let cursor = Cursor::new(EventKind::Infection, 100);

        let outcome = poller.poll(EventKind::Infection, &cursor).await.unwrap();
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.cursor_block, 100);
    }

    #[tokio::test]
    async fn test_delivers_range_and_advances_cursor() {
        let node = Arc::new(MemoryLedgerNode::new(115));
        node.record_event_at(110, infection());
        node.record_event_at(112, infection());
        let poller = PollingFallback::new(node);
        let cursor = Cursor::new(EventKind::Infection, 100);

        let outcome = poller.poll(EventKind::Infection, &cursor).await.unwrap();
        let blocks: Vec<_> = outcome.events.iter().map(|e| e.block_height).collect();
        assert_eq!(blocks, vec![110, 112]);
        assert_eq!(outcome.cursor_block, 115);
    }

    #[tokio::test]
    async fn test_orders_within_cycle() {
        let node = Arc::new(MemoryLedgerNode::new(7));
        // Recorded out of order on purpose; attribution decides delivery.
        node.record_event_at(5, infection());
        node.record_event_at(5, infection());
        node.record_event_at(7, infection());
        let poller = PollingFallback::new(node);
        let cursor = Cursor::new(EventKind::Infection, 0);

        let outcome = poller.poll(EventKind::Infection, &cursor).await.unwrap();
        let keys: Vec<_> = outcome.events.iter().map(RawEvent::ordering_key).collect();
        assert_eq!(keys, vec![(5, 0), (5, 1), (7, 0)]);
    }

    #[tokio::test]
    async fn test_discards_events_at_or_below_cursor() {
        let node = Arc::new(MemoryLedgerNode::new(115));
        node.record_event_at(95, infection());
        node.record_event_at(100, infection());
        node.record_event_at(110, infection());
        let poller = PollingFallback::new(node);
        let cursor = Cursor::new(EventKind::Infection, 100);

        let outcome = poller.poll(EventKind::Infection, &cursor).await.unwrap();
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].block_height, 110);
    }

    #[tokio::test]
    async fn test_failure_then_retry_covers_same_range() {
        let node = Arc::new(MemoryLedgerNode::new(115));
        node.record_event_at(110, infection());
        let poller = PollingFallback::new(node.clone());
        let cursor = Cursor::new(EventKind::Infection, 100);

        node.set_fail_queries(true);
        assert!(poller.poll(EventKind::Infection, &cursor).await.is_err());

        // Cursor untouched by the failure; the retry sees the same events.
        node.set_fail_queries(false);
        let outcome = poller.poll(EventKind::Infection, &cursor).await.unwrap();
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.cursor_block, 115);
    }
}
