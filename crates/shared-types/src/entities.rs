//! # Core Domain Entities
//!
//! Value types for the ledger the contract lives on and the data the
//! contract reports.
//!
//! ## Clusters
//!
//! - **Ledger**: `BlockHeight`, `NetworkId`, `ContractAddress`, `TxReceipt`
//! - **Domain**: `AccountId`, `Location`

use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: THE LEDGER
// =============================================================================

/// A block height on the ledger.
pub type BlockHeight = u64;

/// Numeric identifier of a ledger network (mainnet, testnets, local).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex-encoded address of a deployed contract (`0x`-prefixed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractAddress(pub String);

impl ContractAddress {
    /// Whether the address has the expected `0x` prefix and non-empty body.
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        self.0.len() > 2 && self.0.starts_with("0x")
    }
}

impl std::fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receipt returned by a state-changing contract call.
///
/// Writes are fire-and-forget from the client's perspective: the receipt is
/// passed through to the caller without confirmation tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Hash of the submitted transaction.
    pub tx_hash: String,
    /// Block the transaction was included in, when the node reports one.
    pub block_height: Option<BlockHeight>,
}

// =============================================================================
// CLUSTER B: THE DOMAIN
// =============================================================================

/// Hex-encoded account address of an individual on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geographic location as the contract stores it: `"lat,lng"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location(pub String);

impl Location {
    /// Parse the `"lat,lng"` form into a coordinate pair.
    ///
    /// Returns `None` when the string is not two comma-separated floats;
    /// the contract does not validate the field, so callers must not assume
    /// it parses.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lng) = self.0.split_once(',')?;
        Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
