//! # Subscription Coordinator
//!
//! Single source of truth for how each event kind is observed. One actor
//! task per kind owns that kind's cursor and state machine, so the two
//! trigger sources — transport callbacks and the polling timer — can never
//! interleave for the same kind, and a kind is drained from exactly one
//! delivery path at a time.

use crate::algorithms::initial_cursor_block;
use crate::application::poller::PollingFallback;
use crate::application::subscriber::{EventSubscriber, SubscriberHandle};
use crate::config::WatchConfig;
use crate::domain::{Cursor, KindStatus, SubscriptionState, WatchError, WatchMode};
use crate::ports::inbound::WatchControl;
use crate::ports::outbound::{LedgerConnection, LiveUpdate, NotificationSink, Unsubscribable};
use shared_types::{BlockHeight, EventKind, LedgerError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

type StatusMap = Arc<RwLock<HashMap<EventKind, KindStatus>>>;

/// Entry point: start watching a set of event kinds.
pub struct EventWatch;

impl EventWatch {
    /// Start a watch over `kinds`, delivering into `sink`.
    ///
    /// Fails synchronously on a bad request (empty or duplicated kinds,
    /// unusable config) or when the ledger is unreachable; in that case
    /// nothing was started. After this returns, runtime errors never
    /// propagate to the caller — they become state transitions and logged
    /// warnings, isolated per kind.
    pub async fn start(
        config: WatchConfig,
        client: Arc<dyn LedgerConnection>,
        kinds: &[EventKind],
        sink: Arc<dyn NotificationSink>,
    ) -> Result<WatchHandle, WatchError> {
        config.validate()?;
        if kinds.is_empty() {
            return Err(WatchError::NoKinds);
        }
        let mut requested = HashSet::new();
        for kind in kinds {
            if !requested.insert(*kind) {
                return Err(WatchError::DuplicateKind(*kind));
            }
        }

        let height = client.current_block_height().await?;
        let start_block = initial_cursor_block(height, config.lookback_blocks);
        let session = Uuid::new_v4();
        info!(
            %session,
            height,
            start_block,
            kinds = kinds.len(),
            "Starting event watch"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let statuses: StatusMap = Arc::new(RwLock::new(HashMap::new()));
        {
            let mut map = statuses.write().unwrap_or_else(PoisonError::into_inner);
            for kind in kinds {
                map.insert(
                    *kind,
                    KindStatus {
                        mode: WatchMode::Starting,
                        cursor_block: start_block,
                        attempts: 0,
                        last_error: None,
                    },
                );
            }
        }

        let mut teardowns: Vec<Box<dyn Unsubscribable>> = Vec::new();
        for kind in kinds.iter().copied() {
            let (subscriber, updates) = EventSubscriber::start(
                kind,
                Arc::clone(&client),
                config.live_channel_capacity,
            );
            teardowns.push(Box::new(Arc::clone(&subscriber)));

            let actor = KindActor {
                kind,
                config: config.clone(),
                client: Arc::clone(&client),
                sink: Arc::clone(&sink),
                subscriber,
                statuses: Arc::clone(&statuses),
                shutdown: shutdown_rx.clone(),
            };
            tokio::spawn(actor.run(updates, Cursor::new(kind, start_block)));
        }

        Ok(WatchHandle {
            session,
            shutdown_tx,
            teardowns: Mutex::new(teardowns),
            statuses,
            stopped: AtomicBool::new(false),
        })
    }
}

/// Per-kind actor: sole owner of one kind's cursor and subscription state.
struct KindActor {
    kind: EventKind,
    config: WatchConfig,
    client: Arc<dyn LedgerConnection>,
    sink: Arc<dyn NotificationSink>,
    subscriber: Arc<SubscriberHandle>,
    statuses: StatusMap,
    shutdown: watch::Receiver<bool>,
}

impl KindActor {
    async fn run(self, mut updates: mpsc::Receiver<LiveUpdate>, mut cursor: Cursor) {
        let mut state = SubscriptionState::new();
        state.live_attempt();
        self.publish(&state, &cursor);

        let poller = PollingFallback::new(Arc::clone(&self.client));
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // the first tick is immediate; polling starts one period in

        let connect_window = tokio::time::sleep(self.config.live_connect_timeout());
        tokio::pin!(connect_window);

        let mut shutdown = self.shutdown.clone();

        'watch: loop {
            tokio::select! {
                _ = shutdown.changed() => break 'watch,

                update = updates.recv(), if matches!(state.mode(), WatchMode::LiveAttempt | WatchMode::Live) => {
                    match update {
                        Some(LiveUpdate::Connected) => {
                            state.confirm_live();
                            info!(kind = %self.kind, "Live subscription established");
                        }
                        Some(LiveUpdate::Event(event)) => {
                            // Data implies the handshake completed even if the
                            // connected signal was lost on the way.
                            state.confirm_live();
                            if *shutdown.borrow() {
                                break 'watch;
                            }
                            self.sink.notify(&event);
                            cursor.advance_to(event.block_height);
                        }
                        Some(LiveUpdate::Failed(cause)) => {
                            warn!(
                                kind = %self.kind,
                                error = %cause,
                                "Live subscription failed, degrading to polling"
                            );
                            self.subscriber.stop();
                            state.degrade(Some(cause));
                        }
                        None => {
                            warn!(
                                kind = %self.kind,
                                "Live update channel closed, degrading to polling"
                            );
                            self.subscriber.stop();
                            state.degrade(None);
                        }
                    }
                    self.publish(&state, &cursor);
                }

                _ = &mut connect_window, if state.mode() == WatchMode::LiveAttempt => {
                    warn!(
                        kind = %self.kind,
                        timeout_ms = self.config.live_connect_timeout_ms,
                        "No connected signal within the startup window, degrading to polling"
                    );
                    self.subscriber.stop();
                    state.degrade(Some(LedgerError::Transport(
                        "no connected signal within the startup window".into(),
                    )));
                    self.publish(&state, &cursor);
                }

                _ = ticker.tick() => {
                    if state.mode() != WatchMode::Polling {
                        // Timer fires in every mode; it only has an effect
                        // once the kind is in fallback.
                        continue;
                    }
                    match poller.poll(self.kind, &cursor).await {
                        Ok(outcome) => {
                            for event in &outcome.events {
                                if *shutdown.borrow() {
                                    break 'watch;
                                }
                                self.sink.notify(event);
                            }
                            // Advance only after the whole range reached the sink.
                            cursor.advance_to(outcome.cursor_block);
                        }
                        Err(cause) => {
                            warn!(
                                kind = %self.kind,
                                error = %cause,
                                "Poll cycle failed, retrying on the next tick"
                            );
                            state.record_error(cause);
                        }
                    }
                    self.publish(&state, &cursor);
                }
            }
        }

        state.stop();
        self.publish(&state, &cursor);
        debug!(kind = %self.kind, "Watch actor stopped");
    }

    fn publish(&self, state: &SubscriptionState, cursor: &Cursor) {
        let mut map = self.statuses.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(
            self.kind,
            KindStatus {
                mode: state.mode(),
                cursor_block: cursor.last_processed_block(),
                attempts: state.attempts(),
                last_error: state.last_error().map(ToString::to_string),
            },
        );
    }
}

/// Handle to a running watch.
///
/// Dropping the handle tears the watch down; calling [`WatchHandle::stop`]
/// any number of times is safe.
pub struct WatchHandle {
    session: Uuid,
    shutdown_tx: watch::Sender<bool>,
    teardowns: Mutex<Vec<Box<dyn Unsubscribable>>>,
    statuses: StatusMap,
    stopped: AtomicBool,
}

impl WatchHandle {
    /// Correlation id of this watch session.
    #[must_use]
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// How `kind` is currently observed.
    #[must_use]
    pub fn mode(&self, kind: EventKind) -> Option<WatchMode> {
        self.status_of(kind).map(|s| s.mode)
    }

    /// Last fully processed block for `kind`.
    #[must_use]
    pub fn cursor_block(&self, kind: EventKind) -> Option<BlockHeight> {
        self.status_of(kind).map(|s| s.cursor_block)
    }

    /// Full status snapshot for `kind`.
    #[must_use]
    pub fn status(&self, kind: EventKind) -> Option<KindStatus> {
        self.status_of(kind)
    }

    /// Whether teardown has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Tear the watch down: signal every actor, cancel polling, release
    /// every live handle. Safe to call any number of times, including
    /// while startup work for some kind is still in flight.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(true);
        let mut teardowns = self.teardowns.lock().unwrap_or_else(PoisonError::into_inner);
        for teardown in teardowns.drain(..) {
            teardown.unsubscribe();
        }
        info!(session = %self.session, "Event watch stopped");
    }

    fn status_of(&self, kind: EventKind) -> Option<KindStatus> {
        self.statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }
}

impl WatchControl for WatchHandle {
    fn mode(&self, kind: EventKind) -> Option<WatchMode> {
        WatchHandle::mode(self, kind)
    }

    fn cursor_block(&self, kind: EventKind) -> Option<BlockHeight> {
        WatchHandle::cursor_block(self, kind)
    }

    fn status(&self, kind: EventKind) -> Option<KindStatus> {
        WatchHandle::status(self, kind)
    }

    fn is_stopped(&self) -> bool {
        WatchHandle::is_stopped(self)
    }

    fn stop(&self) {
        WatchHandle::stop(self);
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        WatchHandle::stop(self);
    }
}
