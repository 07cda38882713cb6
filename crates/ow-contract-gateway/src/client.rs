//! # Outbreak Contract Client
//!
//! Typed wrapper over the untyped gateway port. Every contract method the
//! application uses lives here; response decoding tolerates both shapes
//! providers produce (positional tuples and named field maps), and numeric
//! fields may arrive as JSON numbers or decimal strings.

use crate::ports::ContractGateway;
use crate::types::{ExposureRisk, GatewayError, OutbreakLocation, ProximityCheck};
use serde_json::{json, Value};
use shared_types::{AccountId, ContractAddress, Location, NetworkId, TxReceipt};
use tracing::{debug, info, warn};

/// Cap on per-index retrieval when the bulk location query fails. Beyond
/// this the fallback would hammer the node with single-row calls.
const MAX_INDIVIDUAL_FETCH: u64 = 100;

/// Typed client for the outbreak-tracking contract.
pub struct OutbreakContract<G> {
    gateway: G,
    address: ContractAddress,
    signer: AccountId,
}

impl<G: ContractGateway> OutbreakContract<G> {
    /// Resolve the deployment on `network` and build a client over it.
    pub async fn connect(
        gateway: G,
        network: NetworkId,
        signer: AccountId,
    ) -> Result<Self, GatewayError> {
        let address = gateway.resolve_contract_address(network).await?;
        if !address.is_plausible() {
            return Err(GatewayError::Shape {
                method: "resolve_contract_address".into(),
                reason: format!("implausible contract address: {address}"),
            });
        }
        info!(%network, %address, "Connected to outbreak contract");
        Ok(Self {
            gateway,
            address,
            signer,
        })
    }

    /// Build a client for a known deployment, skipping resolution.
    pub fn with_address(gateway: G, address: ContractAddress, signer: AccountId) -> Self {
        Self {
            gateway,
            address,
            signer,
        }
    }

    /// The deployment this client talks to.
    #[must_use]
    pub fn address(&self) -> &ContractAddress {
        &self.address
    }

    // =========================================================================
    // Writes (fire-and-forget)
    // =========================================================================

    /// Record an infection for `subject` at `location`.
    pub async fn report_infection(
        &self,
        subject: &AccountId,
        location: &Location,
        test_result: bool,
    ) -> Result<TxReceipt, GatewayError> {
        let receipt = self
            .gateway
            .send(
                "reportInfection",
                &[json!(subject.0), json!(location.0), json!(test_result)],
                &self.signer,
            )
            .await?;
        debug!(tx_hash = %receipt.tx_hash, "Infection report submitted");
        Ok(receipt)
    }

    /// Register a new tracked location.
    pub async fn report_new_location(
        &self,
        location: &Location,
    ) -> Result<TxReceipt, GatewayError> {
        let receipt = self
            .gateway
            .send("reportNewLocation", &[json!(location.0)], &self.signer)
            .await?;
        debug!(tx_hash = %receipt.tx_hash, "New location submitted");
        Ok(receipt)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Total number of recorded infections.
    pub async fn infected_count(&self) -> Result<u64, GatewayError> {
        let value = self.gateway.call("getInfectedCount", &[]).await?;
        decode_u64(&value).ok_or_else(|| shape("getInfectedCount", "not a count"))
    }

    /// Whether `location` is near a known outbreak.
    pub async fn check_proximity(
        &self,
        location: &Location,
    ) -> Result<ProximityCheck, GatewayError> {
        let method = "checkProximity";
        let value = self.gateway.call(method, &[json!(location.0)]).await?;
        Ok(ProximityCheck {
            is_near_outbreak: bool_field(&value, 0, "isNearOutbreak", method)?,
            outbreak_location: Location(str_field(&value, 1, "outbreakLocation", method)?),
            infected_count: u64_field(&value, 2, "infectedCount", method)?,
            distance: u64_field(&value, 3, "distance", method)?,
        })
    }

    /// Whether infections at `location` overlap the last `time_threshold`
    /// seconds.
    pub async fn check_exposure_risk(
        &self,
        location: &Location,
        time_threshold: u64,
    ) -> Result<ExposureRisk, GatewayError> {
        let method = "checkExposureRisk";
        let value = self
            .gateway
            .call(method, &[json!(location.0), json!(time_threshold)])
            .await?;
        Ok(ExposureRisk {
            exposed: bool_field(&value, 0, "exposed", method)?,
            exposure_count: u64_field(&value, 1, "exposureCount", method)?,
        })
    }

    /// All tracked outbreak locations.
    ///
    /// Tries the bulk query first; when that fails, falls back to counting
    /// and fetching rows one by one, skipping rows that fail individually.
    pub async fn outbreak_locations(&self) -> Result<Vec<OutbreakLocation>, GatewayError> {
        let bulk_error = match self.outbreak_locations_bulk().await {
            Ok(locations) => return Ok(locations),
            Err(e) => e,
        };
        warn!(error = %bulk_error, "Bulk location query failed, fetching per index");

        let count = self.outbreak_locations_count().await?;
        if count > MAX_INDIVIDUAL_FETCH {
            // Too many rows to fetch one at a time; surface the bulk failure.
            return Err(bulk_error);
        }

        let mut locations = Vec::with_capacity(count as usize);
        for index in 0..count {
            match self.outbreak_location_at(index).await {
                Ok(location) => locations.push(location),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable location row");
                }
            }
        }
        Ok(locations)
    }

    /// Number of tracked outbreak locations.
    pub async fn outbreak_locations_count(&self) -> Result<u64, GatewayError> {
        let value = self.gateway.call("getOutbreakLocationsCount", &[]).await?;
        decode_u64(&value).ok_or_else(|| shape("getOutbreakLocationsCount", "not a count"))
    }

    async fn outbreak_locations_bulk(&self) -> Result<Vec<OutbreakLocation>, GatewayError> {
        let method = "getAllOutbreakLocations";
        let value = self.gateway.call(method, &[]).await?;

        let raw_locations = field(&value, 0, "locations")
            .and_then(Value::as_array)
            .ok_or_else(|| shape(method, "missing locations"))?;
        let raw_counts = field(&value, 1, "counts")
            .and_then(Value::as_array)
            .ok_or_else(|| shape(method, "missing counts"))?;

        raw_locations
            .iter()
            .zip(raw_counts)
            .map(|(location, count)| {
                Ok(OutbreakLocation {
                    location: Location(
                        location
                            .as_str()
                            .ok_or_else(|| shape(method, "location is not a string"))?
                            .to_string(),
                    ),
                    infected_count: decode_u64(count)
                        .ok_or_else(|| shape(method, "count is not numeric"))?,
                    observed_at: None,
                })
            })
            .collect()
    }

    async fn outbreak_location_at(&self, index: u64) -> Result<OutbreakLocation, GatewayError> {
        let method = "outbreakLocations";
        let value = self.gateway.call(method, &[json!(index)]).await?;
        Ok(OutbreakLocation {
            location: Location(str_field(&value, 0, "location", method)?),
            infected_count: u64_field(&value, 1, "infectedCount", method)?,
            observed_at: Some(u64_field(&value, 2, "timestamp", method)?),
        })
    }
}

// =============================================================================
// Decoding helpers
// =============================================================================

fn shape(method: &str, reason: &str) -> GatewayError {
    GatewayError::Shape {
        method: method.to_string(),
        reason: reason.to_string(),
    }
}

/// A field of a contract response, addressed positionally for tuple-shaped
/// responses and by name for map-shaped ones.
fn field<'v>(value: &'v Value, index: usize, key: &str) -> Option<&'v Value> {
    match value {
        Value::Array(items) => items.get(index),
        Value::Object(map) => map.get(key),
        _ => None,
    }
}

/// Decode a uint that may arrive as a JSON number or a decimal string.
fn decode_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn u64_field(value: &Value, index: usize, key: &str, method: &str) -> Result<u64, GatewayError> {
    field(value, index, key)
        .and_then(decode_u64)
        .ok_or_else(|| shape(method, &format!("missing or non-numeric {key}")))
}

fn bool_field(value: &Value, index: usize, key: &str, method: &str) -> Result<bool, GatewayError> {
    field(value, index, key)
        .and_then(Value::as_bool)
        .ok_or_else(|| shape(method, &format!("missing or non-boolean {key}")))
}

fn str_field(value: &Value, index: usize, key: &str, method: &str) -> Result<String, GatewayError> {
    field(value, index, key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| shape(method, &format!("missing or non-string {key}")))
}
