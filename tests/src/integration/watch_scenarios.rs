//! # Watch Delivery Scenarios
//!
//! End-to-end checks of the delivery guarantees across mode switches:
//!
//! 1. **Exactly once**: no event reaches the sink twice, whatever mix of
//!    live and polling delivery a kind goes through
//! 2. **Cursor monotonicity**: the per-kind cursor never moves backwards
//! 3. **Ordering**: within one poll cycle, `(block, index)` ascending
//! 4. **One-way mode**: a degraded kind stays degraded until teardown
//! 5. **Idempotent teardown**: duplicate stops are no-ops and silence the sink

#[cfg(test)]
mod tests {
    use ow_event_watch::{
        invariant_cursor_monotonic, invariant_unique_events, notification_channel, EventWatch,
        MemoryLedgerNode, RecordingSink, WatchConfig, WatchMode,
    };
    use shared_types::{
        AccountId, EventKind, EventPayload, InfectionReport, Location, OutbreakAlert,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    fn infection(seq: u64) -> EventPayload {
        EventPayload::Infection(InfectionReport {
            address: AccountId(format!("0x{seq:040x}")),
            location: Location("35.6895,139.6917".into()),
            observed_at: 1_700_000_000 + seq,
        })
    }

    fn alert(count: u64) -> EventPayload {
        EventPayload::OutbreakAlert(OutbreakAlert {
            location: Location("40.7128,-74.0060".into()),
            infected_count: count,
            observed_at: 1_700_000_000,
        })
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..400 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within 2s");
    }

    #[tokio::test]
    async fn test_exactly_once_across_live_failure() {
        let node = Arc::new(MemoryLedgerNode::new(100));
        let sink = Arc::new(RecordingSink::new());
        let handle = EventWatch::start(
            WatchConfig::for_testing(),
            node.clone(),
            &[EventKind::Infection],
            sink.clone(),
        )
        .await
        .expect("watch must start");

        wait_for(|| handle.mode(EventKind::Infection) == Some(WatchMode::Live)).await;

        // A burst of live deliveries over several blocks.
        for seq in 0..5 {
            node.set_height(101 + seq);
            node.record_event(infection(seq));
        }
        wait_for(|| sink.len() == 5).await;

        // Transport dies mid-session.
        node.drop_live();
        wait_for(|| handle.mode(EventKind::Infection) == Some(WatchMode::Polling)).await;

        // More events land after the failure; polling must pick up exactly
        // the ones live delivery never saw.
        node.set_height(120);
        for seq in 5..9 {
            node.record_event_at(110 + seq, infection(seq));
        }
        wait_for(|| sink.len() == 9).await;

        // Give a few extra poll cycles the chance to re-deliver, then check.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let raw = sink.raw_received();
        assert_eq!(raw.len(), 9);
        assert!(invariant_unique_events(&raw));
        handle.stop();
    }

    #[tokio::test]
    async fn test_polling_orders_and_advances_cursor() {
        let node = Arc::new(MemoryLedgerNode::without_live_support(0));
        node.set_height(7);
        // Recorded with the later block first; attribution, not node order,
        // decides delivery.
        node.record_event_at(7, infection(3));
        node.record_event_at(5, infection(1));
        node.record_event_at(5, infection(2));

        let sink = Arc::new(RecordingSink::new());
        let config = WatchConfig {
            lookback_blocks: 100, // cold start covers the whole chain
            ..WatchConfig::for_testing()
        };
        let handle = EventWatch::start(
            config,
            node.clone(),
            &[EventKind::Infection],
            sink.clone(),
        )
        .await
        .expect("watch must start");

        wait_for(|| sink.len() == 3).await;
        let keys: Vec<_> = sink
            .raw_received()
            .iter()
            .map(|e| (e.block_height, e.source_index))
            .collect();
        assert_eq!(keys, vec![(5, 0), (5, 1), (7, 0)]);

        // Cursor followed the chain tip and only ever forward.
        wait_for(|| handle.cursor_block(EventKind::Infection) == Some(7)).await;
        let before = handle.cursor_block(EventKind::Infection).unwrap();
        node.set_height(12);
        node.record_event_at(10, infection(4));
        wait_for(|| sink.len() == 4).await;
        let after = handle.cursor_block(EventKind::Infection).unwrap();
        assert!(invariant_cursor_monotonic(before, after));
        handle.stop();
    }

    #[tokio::test]
    async fn test_degraded_kind_never_upgrades() {
        let node = Arc::new(MemoryLedgerNode::new(50));
        let sink = Arc::new(RecordingSink::new());
        let handle = EventWatch::start(
            WatchConfig::for_testing(),
            node.clone(),
            &[EventKind::OutbreakAlert],
            sink.clone(),
        )
        .await
        .expect("watch must start");

        wait_for(|| handle.mode(EventKind::OutbreakAlert) == Some(WatchMode::Live)).await;
        node.drop_live();
        wait_for(|| handle.mode(EventKind::OutbreakAlert) == Some(WatchMode::Polling)).await;

        // Even with the transport healthy again, the kind stays in fallback
        // for the rest of the session.
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(
                handle.mode(EventKind::OutbreakAlert),
                Some(WatchMode::Polling)
            );
        }
        handle.stop();
    }

    #[tokio::test]
    async fn test_idempotent_teardown_silences_sink() {
        let node = Arc::new(MemoryLedgerNode::new(50));
        let sink = Arc::new(RecordingSink::new());
        let handle = EventWatch::start(
            WatchConfig::for_testing(),
            node.clone(),
            &EventKind::ALL,
            sink.clone(),
        )
        .await
        .expect("watch must start");

        wait_for(|| handle.mode(EventKind::Infection) == Some(WatchMode::Live)).await;

        handle.stop();
        handle.stop();
        wait_for(|| handle.mode(EventKind::Infection) == Some(WatchMode::Stopped)).await;
        wait_for(|| handle.mode(EventKind::OutbreakAlert) == Some(WatchMode::Stopped)).await;

        let delivered = sink.len();
        node.set_height(90);
        node.record_event(infection(1));
        node.record_event(alert(5));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.len(), delivered);
    }

    #[tokio::test]
    async fn test_kinds_route_to_their_callbacks() {
        let node = Arc::new(MemoryLedgerNode::new(50));
        let sink = Arc::new(RecordingSink::new());
        let handle = EventWatch::start(
            WatchConfig::for_testing(),
            node.clone(),
            &EventKind::ALL,
            sink.clone(),
        )
        .await
        .expect("watch must start");

        wait_for(|| {
            handle.mode(EventKind::Infection) == Some(WatchMode::Live)
                && handle.mode(EventKind::OutbreakAlert) == Some(WatchMode::Live)
        })
        .await;

        node.set_height(51);
        node.record_event(infection(1));
        node.record_event(alert(7));
        wait_for(|| sink.len() == 2).await;

        let received = sink.received();
        assert!(received
            .iter()
            .any(|p| matches!(p, EventPayload::Infection(_))));
        assert!(received.iter().any(|p| matches!(
            p,
            EventPayload::OutbreakAlert(OutbreakAlert { infected_count: 7, .. })
        )));
        handle.stop();
    }

    #[tokio::test]
    async fn test_stream_consumption_via_channel_sink() {
        let node = Arc::new(MemoryLedgerNode::new(50));
        let (sink, mut stream) = notification_channel();
        let handle = EventWatch::start(
            WatchConfig::for_testing(),
            node.clone(),
            &[EventKind::Infection],
            Arc::new(sink),
        )
        .await
        .expect("watch must start");

        wait_for(|| handle.mode(EventKind::Infection) == Some(WatchMode::Live)).await;
        node.set_height(51);
        node.record_event(infection(9));

        let payload = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for stream item")
            .expect("stream must yield the event");
        assert!(matches!(payload, EventPayload::Infection(_)));

        // Teardown closes the stream once the buffer drains.
        handle.stop();
        drop(handle);
        let end = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for stream end");
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn test_cold_start_covers_lookback_window() {
        let node = Arc::new(MemoryLedgerNode::without_live_support(500));
        // Events already on chain before the client starts: one inside the
        // lookback window, one before it.
        node.record_event_at(489, infection(1));
        node.record_event_at(495, infection(2));

        let sink = Arc::new(RecordingSink::new());
        let config = WatchConfig {
            lookback_blocks: 10, // cursor starts at 490
            ..WatchConfig::for_testing()
        };
        let handle = EventWatch::start(
            config,
            node.clone(),
            &[EventKind::Infection],
            sink.clone(),
        )
        .await
        .expect("watch must start");

        // The chain must advance for the first poll to run.
        node.set_height(501);
        wait_for(|| sink.len() == 1).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Only the event above the derived cursor is replayed.
        let raw = sink.raw_received();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].block_height, 495);
        handle.stop();
    }
}
