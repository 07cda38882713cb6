//! # In-Process Ledger Node
//!
//! A ledger node that lives inside the process: it tracks a block height,
//! records contract events, and pushes them to live subscribers over a
//! broadcast channel. The runtime binary drives it as a demo feed, and the
//! test suites use it to script every failure the watch core must survive.

use crate::ports::outbound::{LedgerConnection, LiveSubscription, LiveUpdate, Unsubscribable};
use async_trait::async_trait;
use shared_types::{BlockHeight, EventKind, EventPayload, LedgerError, RawEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc, Notify};

/// What the node broadcasts to its live forwarders.
///
/// `Disconnect(None)` drops every subscription; `Disconnect(Some(kind))`
/// only the ones for that kind.
#[derive(Debug, Clone)]
enum NodeSignal {
    Event(RawEvent),
    Disconnect(Option<EventKind>),
}

struct NodeInner {
    height: BlockHeight,
    events: Vec<RawEvent>,
}

/// Simulated ledger node with fault injection.
pub struct MemoryLedgerNode {
    inner: Mutex<NodeInner>,
    live_tx: broadcast::Sender<NodeSignal>,
    live_enabled: AtomicBool,
    fail_requests: AtomicBool,
    fail_queries: AtomicBool,
}

impl MemoryLedgerNode {
    /// Create a node whose chain tip is at `height`.
    #[must_use]
    pub fn new(height: BlockHeight) -> Self {
        let (live_tx, _) = broadcast::channel(256);
        Self {
            inner: Mutex::new(NodeInner {
                height,
                events: Vec::new(),
            }),
            live_tx,
            live_enabled: AtomicBool::new(true),
            fail_requests: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
        }
    }

    /// Create a node that rejects push subscriptions, forcing polling.
    #[must_use]
    pub fn without_live_support(height: BlockHeight) -> Self {
        let node = Self::new(height);
        node.live_enabled.store(false, Ordering::SeqCst);
        node
    }

    fn state(&self) -> MutexGuard<'_, NodeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Toggle push-subscription support.
    pub fn set_live_enabled(&self, enabled: bool) {
        self.live_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Make every request fail, as if the node were unreachable.
    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Make range queries fail while height reads still succeed.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Current chain tip.
    #[must_use]
    pub fn height(&self) -> BlockHeight {
        self.state().height
    }

    /// Move the chain tip to `height`.
    pub fn set_height(&self, height: BlockHeight) {
        self.state().height = height;
    }

    /// Mine one empty block; returns the new tip.
    pub fn produce_block(&self) -> BlockHeight {
        let mut state = self.state();
        state.height += 1;
        state.height
    }

    /// Record an event at the current tip and push it to live subscribers.
    pub fn record_event(&self, payload: EventPayload) -> RawEvent {
        let height = self.height();
        self.record_event_at(height, payload)
    }

    /// Record an event at an explicit block.
    ///
    /// The source index is the emission count of that kind in that block,
    /// which is exactly how the chain attributes it.
    pub fn record_event_at(&self, block: BlockHeight, payload: EventPayload) -> RawEvent {
        let kind = payload.kind();
        let mut state = self.state();
        let source_index = state
            .events
            .iter()
            .filter(|e| e.kind == kind && e.block_height == block)
            .count() as u32;
        let event = RawEvent::new(block, source_index, payload);
        state.events.push(event.clone());
        drop(state);

        let _ = self.live_tx.send(NodeSignal::Event(event.clone()));
        event
    }

    /// Drop every live subscription, as a failing transport would.
    pub fn drop_live(&self) {
        let _ = self.live_tx.send(NodeSignal::Disconnect(None));
    }

    /// Drop only the live subscriptions for `kind`.
    pub fn drop_live_for(&self, kind: EventKind) {
        let _ = self.live_tx.send(NodeSignal::Disconnect(Some(kind)));
    }
}

/// Teardown handle for one forwarder task.
struct ForwarderCanceller {
    stop: Arc<Notify>,
}

impl Unsubscribable for ForwarderCanceller {
    fn unsubscribe(&self) {
        self.stop.notify_one();
    }
}

#[async_trait]
impl LedgerConnection for MemoryLedgerNode {
    async fn current_block_height(&self) -> Result<BlockHeight, LedgerError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("node unreachable".into()));
        }
        Ok(self.height())
    }

    async fn query_past_events(
        &self,
        kind: EventKind,
        from: BlockHeight,
        to: BlockHeight,
    ) -> Result<Vec<RawEvent>, LedgerError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("node unreachable".into()));
        }
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(LedgerError::Query {
                from,
                to,
                reason: "injected fault".into(),
            });
        }

        // Insertion order, deliberately not sorted: ordering is the
        // caller's contract, not the node's.
        Ok(self
            .state()
            .events
            .iter()
            .filter(|e| e.kind == kind && e.block_height >= from && e.block_height <= to)
            .cloned()
            .collect())
    }

    async fn subscribe(&self, kind: EventKind) -> Result<LiveSubscription, LedgerError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("node unreachable".into()));
        }
        if !self.live_enabled.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport(
                "node does not support push subscriptions".into(),
            ));
        }

        let mut signals = self.live_tx.subscribe();
        let (tx, rx) = mpsc::channel(64);
        let stop = Arc::new(Notify::new());
        let task_stop = Arc::clone(&stop);

        tokio::spawn(async move {
            if tx.send(LiveUpdate::Connected).await.is_err() {
                return;
            }
            loop {
                tokio::select! {
                    _ = task_stop.notified() => break,
                    signal = signals.recv() => match signal {
                        Ok(NodeSignal::Event(event)) if event.kind == kind => {
                            if tx.send(LiveUpdate::Event(event)).await.is_err() {
                                break;
                            }
                        }
                        Ok(NodeSignal::Event(_)) => {}
                        Ok(NodeSignal::Disconnect(filter))
                            if filter.is_none() || filter == Some(kind) =>
                        {
                            let _ = tx
                                .send(LiveUpdate::Failed(LedgerError::Transport(
                                    "connection dropped".into(),
                                )))
                                .await;
                            break;
                        }
                        Ok(NodeSignal::Disconnect(_)) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => {
                            let _ = tx
                                .send(LiveUpdate::Failed(LedgerError::Transport(
                                    "node shut down".into(),
                                )))
                                .await;
                            break;
                        }
                    },
                }
            }
        });

        Ok(LiveSubscription {
            updates: rx,
            canceller: Box::new(ForwarderCanceller { stop }),
        })
    }
}
