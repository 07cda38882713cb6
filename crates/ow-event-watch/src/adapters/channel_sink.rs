//! # Channel Sink
//!
//! A [`NotificationSink`] backed by a channel, for applications that prefer
//! one unified stream over a callback pair.

use crate::ports::outbound::NotificationSink;
use shared_types::{EventPayload, InfectionReport, OutbreakAlert};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// Sink half: hand this to the watch.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EventPayload>,
}

/// Stream half: consume notifications in delivery order.
///
/// Yields `None` once the watch is stopped and the buffer is drained.
pub struct NotificationStream {
    rx: mpsc::UnboundedReceiver<EventPayload>,
}

/// Create a connected sink/stream pair.
#[must_use]
pub fn notification_channel() -> (ChannelSink, NotificationStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, NotificationStream { rx })
}

impl NotificationSink for ChannelSink {
    fn on_infection(&self, report: InfectionReport) {
        let _ = self.tx.send(EventPayload::Infection(report));
    }

    fn on_outbreak_alert(&self, alert: OutbreakAlert) {
        let _ = self.tx.send(EventPayload::OutbreakAlert(alert));
    }
}

impl NotificationStream {
    /// Receive the next notification.
    pub async fn recv(&mut self) -> Option<EventPayload> {
        self.rx.recv().await
    }
}

impl Stream for NotificationStream {
    type Item = EventPayload;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AccountId, Location};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_sink_to_stream() {
        let (sink, mut stream) = notification_channel();
        sink.on_infection(InfectionReport {
            address: AccountId("0xabc".into()),
            location: Location("0,0".into()),
            observed_at: 0,
        });

        let payload = timeout(Duration::from_millis(100), stream.recv())
            .await
            .expect("timeout")
            .expect("payload");
        assert!(matches!(payload, EventPayload::Infection(_)));
    }

    #[tokio::test]
    async fn test_stream_ends_when_sink_dropped() {
        let (sink, mut stream) = notification_channel();
        sink.on_outbreak_alert(OutbreakAlert {
            location: Location("1,1".into()),
            infected_count: 3,
            observed_at: 0,
        });
        drop(sink);

        assert!(stream.recv().await.is_some());
        assert!(stream.recv().await.is_none());
    }
}
