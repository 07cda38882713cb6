//! # Outbreak-Watch Event Core
//!
//! Resilient observation of contract events over an unreliable ledger
//! connection.
//!
//! ## Purpose
//!
//! Deliver each contract event to the application exactly once, with low
//! latency when the node supports push subscriptions and via periodic
//! range polling when it does not:
//! - One live-subscription attempt per event kind, with a bounded window
//!   for the connected signal
//! - Fallback to polling on any transport failure; the degraded mode is
//!   kept until teardown
//! - Per-kind progress cursor, monotonic, advanced only after delivery
//! - Deduplicated, `(block, index)`-ordered delivery within a poll cycle
//!
//! ## Module Structure
//!
//! ```text
//! ow-event-watch/
//! ├── domain/          # Cursor, subscription state machine, invariants
//! ├── algorithms/      # Ordering, dedup, lookback/range arithmetic
//! ├── ports/           # WatchControl (inbound), LedgerConnection + sinks (outbound)
//! ├── application/     # Coordinator, live subscriber, polling fallback
//! ├── adapters/        # Wire codec, in-process node, channel sink
//! └── config.rs        # WatchConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    decode_event, decode_events, notification_channel, ChannelSink, MemoryLedgerNode,
    NotificationStream, WireEvent,
};
pub use application::{EventWatch, PollOutcome, PollingFallback, WatchHandle};
pub use application::{EventSubscriber, SubscriberHandle, SubscriberStatus};
pub use config::WatchConfig;
pub use domain::{
    invariant_cursor_monotonic, invariant_mode_transition, invariant_unique_events, Cursor,
    KindStatus, SubscriptionState, WatchError, WatchMode,
};
pub use ports::{
    LedgerConnection, LiveSubscription, LiveUpdate, NotificationSink, RecordingSink,
    Unsubscribable, WatchControl,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
