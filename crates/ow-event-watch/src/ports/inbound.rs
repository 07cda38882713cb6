//! # Inbound Port
//!
//! The control surface a running watch exposes to the application.

use crate::domain::{KindStatus, WatchMode};
use shared_types::{BlockHeight, EventKind};

/// Control and introspection for a running watch.
pub trait WatchControl: Send + Sync {
    /// How `kind` is currently observed, or `None` if it is not watched.
    fn mode(&self, kind: EventKind) -> Option<WatchMode>;

    /// The last fully processed block for `kind`.
    fn cursor_block(&self, kind: EventKind) -> Option<BlockHeight>;

    /// Full status snapshot for `kind`.
    fn status(&self, kind: EventKind) -> Option<KindStatus>;

    /// Whether teardown has been requested.
    fn is_stopped(&self) -> bool;

    /// Tear the watch down. Idempotent; never panics.
    fn stop(&self);
}
