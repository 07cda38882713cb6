//! # Ports
//!
//! Inbound: the control surface the application sees.
//! Outbound: the traits the subsystem needs from the outside world — a
//! ledger connection and a notification sink.

pub mod inbound;
pub mod outbound;

pub use inbound::WatchControl;
pub use outbound::{
    LedgerConnection, LiveSubscription, LiveUpdate, NotificationSink, RecordingSink,
    Unsubscribable,
};
