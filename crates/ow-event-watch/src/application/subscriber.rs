//! # Event Subscriber
//!
//! One live-subscription attempt for one event kind. Transport updates are
//! forwarded to the coordinator in arrival order; a failure is reported
//! exactly once; retry policy belongs to the coordinator, not here.

use crate::ports::outbound::{LedgerConnection, LiveSubscription, LiveUpdate, Unsubscribable};
use shared_types::{EventKind, LedgerError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Where a live attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberStatus {
    /// Subscription requested, no confirmation yet.
    Connecting,
    /// The node confirmed the subscription.
    Connected,
    /// The attempt or the established subscription died.
    Failed,
}

/// Handle to one live attempt. Stopping is idempotent: a second `stop`, or
/// a `stop` on an already-failed handle, is a no-op and never panics.
pub struct SubscriberHandle {
    kind: EventKind,
    stopped: AtomicBool,
    status: Mutex<SubscriberStatus>,
    canceller: Mutex<Option<Box<dyn Unsubscribable>>>,
}

impl SubscriberHandle {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            stopped: AtomicBool::new(false),
            status: Mutex::new(SubscriberStatus::Connecting),
            canceller: Mutex::new(None),
        }
    }

    /// The kind this attempt covers.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Current status of the attempt.
    #[must_use]
    pub fn status(&self) -> SubscriberStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `stop` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Tear the live attempt down.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut slot = self.canceller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(canceller) = slot.take() {
            canceller.unsubscribe();
        }
        debug!(kind = %self.kind, "Live subscription handle stopped");
    }

    fn set_status(&self, status: SubscriberStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Store the transport's teardown capability, or release it right away
    /// when stop already happened while the handshake was in flight.
    fn install_canceller(&self, canceller: Box<dyn Unsubscribable>) {
        let mut slot = self.canceller.lock().unwrap_or_else(PoisonError::into_inner);
        if self.stopped.load(Ordering::SeqCst) {
            canceller.unsubscribe();
        } else {
            *slot = Some(canceller);
        }
    }
}

impl Unsubscribable for SubscriberHandle {
    fn unsubscribe(&self) {
        self.stop();
    }
}

/// Factory for live-subscription attempts.
pub struct EventSubscriber;

impl EventSubscriber {
    /// Start one live attempt for `kind`.
    ///
    /// Returns the teardown handle and the channel the coordinator reads
    /// updates from. The channel carries at most one `Failed` message; when
    /// it closes without one, the attempt was stopped deliberately.
    pub fn start(
        kind: EventKind,
        client: Arc<dyn LedgerConnection>,
        channel_capacity: usize,
    ) -> (Arc<SubscriberHandle>, mpsc::Receiver<LiveUpdate>) {
        let (tx, rx) = mpsc::channel(channel_capacity);
        let handle = Arc::new(SubscriberHandle::new(kind));
        let task_handle = Arc::clone(&handle);

        tokio::spawn(async move {
            match client.subscribe(kind).await {
                Err(cause) => {
                    warn!(kind = %kind, error = %cause, "Live subscription attempt failed");
                    task_handle.set_status(SubscriberStatus::Failed);
                    let _ = tx.send(LiveUpdate::Failed(cause)).await;
                }
                Ok(LiveSubscription {
                    mut updates,
                    canceller,
                }) => {
                    task_handle.install_canceller(canceller);

                    let mut failed = false;
                    while let Some(update) = updates.recv().await {
                        match &update {
                            LiveUpdate::Connected => {
                                task_handle.set_status(SubscriberStatus::Connected);
                            }
                            LiveUpdate::Failed(_) => {
                                task_handle.set_status(SubscriberStatus::Failed);
                                failed = true;
                            }
                            LiveUpdate::Event(_) => {}
                        }
                        if tx.send(update).await.is_err() {
                            // Coordinator went away; nothing left to forward to.
                            return;
                        }
                        if failed {
                            return;
                        }
                    }

                    if !task_handle.is_stopped() {
                        // The transport closed the stream without a terminal
                        // error; report it as one, once.
                        task_handle.set_status(SubscriberStatus::Failed);
                        let _ = tx
                            .send(LiveUpdate::Failed(LedgerError::Transport(
                                "subscription stream ended".into(),
                            )))
                            .await;
                    }
                }
            }
        });

        (handle, rx)
    }
}
