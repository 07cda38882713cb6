//! # Error Types
//!
//! Errors shared between the watch core and the contract gateway. Both talk
//! to the same ledger node, so they share one failure taxonomy for it.

use crate::entities::BlockHeight;
use thiserror::Error;

/// Failures at the ledger boundary.
///
/// `Transport` is fatal to a live subscription (the affected kind degrades
/// to polling); `Query` is recoverable (the same range is retried on the
/// next cycle); `Decode` means the node returned a payload the declared
/// schema cannot accept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The connection to the node dropped or the handshake failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A block-range query failed.
    #[error("Query failed for blocks {from}..={to}: {reason}")]
    Query {
        /// First block of the failed range.
        from: BlockHeight,
        /// Last block of the failed range.
        to: BlockHeight,
        /// Node-reported cause.
        reason: String,
    },

    /// A request/response call to the node failed.
    #[error("Call to {method} failed: {reason}")]
    Rpc {
        /// The contract method or RPC that failed.
        method: String,
        /// Node-reported cause.
        reason: String,
    },

    /// The node returned a payload that does not match the event schema.
    #[error("Malformed payload: {0}")]
    Decode(String),
}
