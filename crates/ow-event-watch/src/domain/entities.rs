//! # Watch Entities
//!
//! Per-kind bookkeeping owned exclusively by the coordinator: the progress
//! cursor and the subscription state machine.

use serde::{Deserialize, Serialize};
use shared_types::{BlockHeight, EventKind, LedgerError};

/// Progress cursor for one event kind.
///
/// `last_processed_block` is monotonically non-decreasing for the lifetime
/// of the cursor and only advances after the corresponding events have been
/// fully delivered to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    kind: EventKind,
    last_processed_block: BlockHeight,
}

impl Cursor {
    /// Create a cursor starting at `block`.
    #[must_use]
    pub fn new(kind: EventKind, block: BlockHeight) -> Self {
        Self {
            kind,
            last_processed_block: block,
        }
    }

    /// The kind this cursor tracks.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The last block known to be fully processed.
    #[must_use]
    pub fn last_processed_block(&self) -> BlockHeight {
        self.last_processed_block
    }

    /// Advance to `block`. Lower values are ignored, never rewound.
    pub fn advance_to(&mut self, block: BlockHeight) {
        if block > self.last_processed_block {
            self.last_processed_block = block;
        }
    }
}

/// How a kind is currently observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchMode {
    /// Coordinator is setting the kind up.
    Starting,
    /// A live subscription was requested; waiting for the connected signal.
    LiveAttempt,
    /// Events arrive over the live subscription.
    Live,
    /// Events arrive via periodic range polling. Absorbing until teardown.
    Polling,
    /// Torn down. Terminal.
    Stopped,
}

impl std::fmt::Display for WatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WatchMode::Starting => "starting",
            WatchMode::LiveAttempt => "live-attempt",
            WatchMode::Live => "live",
            WatchMode::Polling => "polling",
            WatchMode::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Subscription state for one kind. Mutated only by the coordinator's own
/// trigger handlers; no other component touches it.
#[derive(Debug, Clone)]
pub struct SubscriptionState {
    mode: WatchMode,
    attempts: u32,
    last_error: Option<LedgerError>,
}

impl SubscriptionState {
    /// Fresh state in `Starting` mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: WatchMode::Starting,
            attempts: 0,
            last_error: None,
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    /// Number of live-subscription attempts made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The most recent error seen for this kind, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&LedgerError> {
        self.last_error.as_ref()
    }

    /// A live subscription attempt went out.
    pub fn live_attempt(&mut self) {
        if self.mode == WatchMode::Starting {
            self.mode = WatchMode::LiveAttempt;
            self.attempts += 1;
        }
    }

    /// The transport confirmed the subscription.
    pub fn confirm_live(&mut self) {
        if self.mode == WatchMode::LiveAttempt {
            self.mode = WatchMode::Live;
        }
    }

    /// Degrade to polling. Legal from `LiveAttempt` and `Live`; a no-op once
    /// already polling — the mode is one-way for the subscription lifetime.
    pub fn degrade(&mut self, cause: Option<LedgerError>) {
        if matches!(self.mode, WatchMode::LiveAttempt | WatchMode::Live) {
            self.mode = WatchMode::Polling;
            self.last_error = cause;
        }
    }

    /// Record an error without changing mode (recoverable poll failures).
    pub fn record_error(&mut self, cause: LedgerError) {
        self.last_error = Some(cause);
    }

    /// Terminal teardown, reachable from any state.
    pub fn stop(&mut self) {
        self.mode = WatchMode::Stopped;
    }
}

impl Default for SubscriptionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of one kind's state, as exposed through the control port.
#[derive(Debug, Clone)]
pub struct KindStatus {
    /// Current observation mode.
    pub mode: WatchMode,
    /// Last fully processed block.
    pub cursor_block: BlockHeight,
    /// Live-subscription attempts made.
    pub attempts: u32,
    /// Most recent error, rendered for display.
    pub last_error: Option<String>,
}
