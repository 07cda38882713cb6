//! # Watch Errors
//!
//! Failures surfaced synchronously from `start()`. Everything after startup
//! is converted to a state transition or a logged warning inside the
//! coordinator's trigger handlers; errors local to one kind never affect
//! other kinds.

use shared_types::{EventKind, LedgerError};
use thiserror::Error;

/// Errors from starting or configuring a watch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The caller requested an empty set of kinds.
    #[error("No event kinds requested")]
    NoKinds,

    /// The same kind was requested twice.
    #[error("Duplicate event kind requested: {0}")]
    DuplicateKind(EventKind),

    /// A configuration value the coordinator cannot run with.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The ledger was unreachable at startup; the subsystem did not start.
    #[error("Cannot reach ledger at startup: {0}")]
    Initialization(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_kind_names_the_kind() {
        let err = WatchError::DuplicateKind(EventKind::OutbreakAlert);
        assert!(err.to_string().contains("PotentialOutbreak"));
    }

    #[test]
    fn test_initialization_wraps_ledger_error() {
        let err = WatchError::from(LedgerError::Transport("refused".into()));
        assert!(matches!(err, WatchError::Initialization(_)));
        assert!(err.to_string().contains("refused"));
    }
}
