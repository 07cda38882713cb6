//! # Application Layer
//!
//! Orchestration of the watch: the per-kind live subscriber, the polling
//! fallback, and the coordinator that owns the mode state machine and the
//! single delivery path into the sink.

pub mod coordinator;
pub mod poller;
pub mod subscriber;

pub use coordinator::{EventWatch, WatchHandle};
pub use poller::{PollOutcome, PollingFallback};
pub use subscriber::{EventSubscriber, SubscriberHandle, SubscriberStatus};
