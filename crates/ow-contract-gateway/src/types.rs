//! # Gateway Types
//!
//! Typed results of the contract's read queries, plus the gateway error.

use serde::{Deserialize, Serialize};
use shared_types::{LedgerError, Location};
use thiserror::Error;

/// Result of `checkProximity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityCheck {
    /// Whether the queried location is near a known outbreak.
    pub is_near_outbreak: bool,
    /// The nearest outbreak location, when there is one.
    pub outbreak_location: Location,
    /// Infections recorded at that location.
    pub infected_count: u64,
    /// Distance to the outbreak, in the contract's grid units.
    pub distance: u64,
}

/// Result of `checkExposureRisk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureRisk {
    /// Whether any recorded infection overlaps the queried window.
    pub exposed: bool,
    /// Number of overlapping infection records.
    pub exposure_count: u64,
}

/// One outbreak location as the contract stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutbreakLocation {
    /// The location.
    pub location: Location,
    /// Infections recorded there.
    pub infected_count: u64,
    /// Contract-side unix timestamp of the record (seconds). The bulk
    /// query does not return one; the per-index query does.
    pub observed_at: Option<u64>,
}

/// Failures of a gateway operation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The underlying ledger call failed.
    #[error("Ledger call failed: {0}")]
    Ledger(#[from] LedgerError),

    /// The node answered, but not in a shape the contract ABI declares.
    #[error("Unexpected response shape from {method}: {reason}")]
    Shape {
        /// The contract method whose response was malformed.
        method: String,
        /// What was wrong with it.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_from_ledger() {
        let err = GatewayError::from(LedgerError::Rpc {
            method: "checkProximity".into(),
            reason: "reverted".into(),
        });
        assert!(matches!(err, GatewayError::Ledger(_)));
        assert!(err.to_string().contains("checkProximity"));
    }

    #[test]
    fn test_shape_error_display() {
        let err = GatewayError::Shape {
            method: "getAllOutbreakLocations".into(),
            reason: "missing locations field".into(),
        };
        assert!(err.to_string().contains("getAllOutbreakLocations"));
    }
}
