//! # Adapters
//!
//! Concrete implementations at the edges: the wire codec that turns a
//! node's untyped event rows into typed [`shared_types::RawEvent`]s, an
//! in-process ledger node for demos and tests, and a channel-backed sink
//! for stream-style consumption.

pub mod channel_sink;
pub mod codec;
pub mod memory_node;

pub use channel_sink::{notification_channel, ChannelSink, NotificationStream};
pub use codec::{decode_event, decode_events, WireEvent};
pub use memory_node::MemoryLedgerNode;
