//! # Outbound Ports
//!
//! Traits for the subsystem's external dependencies: the ledger node the
//! events come from, and the application sink they go to.

use async_trait::async_trait;
use shared_types::{
    BlockHeight, EventKind, InfectionReport, LedgerError, OutbreakAlert, RawEvent,
};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Tagged updates a live subscription delivers.
///
/// One channel message per transport callback: the connected handshake,
/// an event, or the terminal failure.
#[derive(Debug, Clone)]
pub enum LiveUpdate {
    /// The node confirmed the subscription.
    Connected,
    /// An event arrived over the push channel.
    Event(RawEvent),
    /// The subscription died. Terminal; no further updates follow.
    Failed(LedgerError),
}

/// Uniform teardown capability.
///
/// Every handle a watch holds — live subscriptions, subscriber tasks —
/// implements this, so teardown is one code path with no type-sniffing.
/// Implementations must be idempotent and must never panic.
pub trait Unsubscribable: Send + Sync {
    /// Release the underlying resource. Safe to call more than once.
    fn unsubscribe(&self);
}

impl<T: Unsubscribable + ?Sized> Unsubscribable for std::sync::Arc<T> {
    fn unsubscribe(&self) {
        (**self).unsubscribe();
    }
}

/// One live push subscription for a single event kind.
pub struct LiveSubscription {
    /// Updates from the transport, in delivery order.
    pub updates: mpsc::Receiver<LiveUpdate>,
    /// Teardown capability for the transport side.
    pub canceller: Box<dyn Unsubscribable>,
}

/// Connection to a ledger node.
///
/// Implementations talk to one node; they hold no per-kind watch state.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Current height of the chain as this node sees it.
    async fn current_block_height(&self) -> Result<BlockHeight, LedgerError>;

    /// Events of `kind` emitted in `[from, to]` inclusive.
    ///
    /// No ordering is promised; callers sort.
    async fn query_past_events(
        &self,
        kind: EventKind,
        from: BlockHeight,
        to: BlockHeight,
    ) -> Result<Vec<RawEvent>, LedgerError>;

    /// Open a push subscription for `kind`.
    ///
    /// Nodes without push support return `Err` immediately; the caller
    /// falls back to polling.
    async fn subscribe(&self, kind: EventKind) -> Result<LiveSubscription, LedgerError>;
}

/// The application-level callback set receiving deduplicated, typed
/// domain events.
pub trait NotificationSink: Send + Sync {
    /// A new infection was recorded.
    fn on_infection(&self, report: InfectionReport);

    /// A location crossed the outbreak threshold.
    fn on_outbreak_alert(&self, alert: OutbreakAlert);

    /// Dispatch a raw event to the matching callback.
    fn notify(&self, event: &RawEvent) {
        match &event.payload {
            shared_types::EventPayload::Infection(report) => self.on_infection(report.clone()),
            shared_types::EventPayload::OutbreakAlert(alert) => {
                self.on_outbreak_alert(alert.clone());
            }
        }
    }
}

// =============================================================================
// Test Sink
// =============================================================================

/// Sink that records every notification, for assertions in tests.
///
/// Keeps both the typed payloads (what the callbacks saw) and the raw
/// events with their ledger attribution (for duplicate checks).
#[derive(Default)]
pub struct RecordingSink {
    payloads: Mutex<Vec<shared_types::EventPayload>>,
    raw: Mutex<Vec<RawEvent>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every payload received so far, in delivery order.
    #[must_use]
    pub fn received(&self) -> Vec<shared_types::EventPayload> {
        self.payloads.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Every raw event received so far, with ledger attribution.
    #[must_use]
    pub fn raw_received(&self) -> Vec<RawEvent> {
        self.raw.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of notifications received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether nothing was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for RecordingSink {
    fn on_infection(&self, report: InfectionReport) {
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.push(shared_types::EventPayload::Infection(report));
        }
    }

    fn on_outbreak_alert(&self, alert: OutbreakAlert) {
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.push(shared_types::EventPayload::OutbreakAlert(alert));
        }
    }

    fn notify(&self, event: &RawEvent) {
        if let Ok(mut raw) = self.raw.lock() {
            raw.push(event.clone());
        }
        match &event.payload {
            shared_types::EventPayload::Infection(report) => self.on_infection(report.clone()),
            shared_types::EventPayload::OutbreakAlert(alert) => {
                self.on_outbreak_alert(alert.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AccountId, EventPayload, Location};

    #[test]
    fn test_recording_sink_dispatch() {
        let sink = RecordingSink::new();
        let event = RawEvent::new(
            5,
            0,
            EventPayload::Infection(InfectionReport {
                address: AccountId("0xabc".into()),
                location: Location("0,0".into()),
                observed_at: 1_700_000_000,
            }),
        );

        sink.notify(&event);

        assert_eq!(sink.len(), 1);
        assert!(matches!(
            sink.received()[0],
            EventPayload::Infection(_)
        ));
    }

    #[test]
    fn test_recording_sink_orders_deliveries() {
        let sink = RecordingSink::new();
        sink.on_outbreak_alert(OutbreakAlert {
            location: Location("1,1".into()),
            infected_count: 5,
            observed_at: 0,
        });
        sink.on_infection(InfectionReport {
            address: AccountId("0xabc".into()),
            location: Location("0,0".into()),
            observed_at: 0,
        });

        let received = sink.received();
        assert!(matches!(received[0], EventPayload::OutbreakAlert(_)));
        assert!(matches!(received[1], EventPayload::Infection(_)));
    }
}
