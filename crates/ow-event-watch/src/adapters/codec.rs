//! # Wire Codec
//!
//! Ledger nodes report contract events as a name plus a bag of string-keyed
//! fields. This module decodes that bag into the typed payloads exactly
//! once; nothing past this boundary reads untyped maps.

use serde::{Deserialize, Deserializer};
use shared_types::{
    AccountId, EventKind, EventPayload, InfectionReport, LedgerError, Location, OutbreakAlert,
    RawEvent,
};

/// One event row as the node's RPC returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    /// ABI event name (`"NewInfection"`, `"PotentialOutbreak"`).
    pub event: String,
    /// Block the event was emitted in.
    pub block_number: u64,
    /// Emission index within the block.
    pub log_index: u32,
    /// Kind-specific fields, still untyped.
    pub return_values: serde_json::Value,
}

/// Numeric fields arrive as JSON numbers from some nodes and as decimal
/// strings from others; accept both.
fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfectionFields {
    individual_address: String,
    location: String,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    timestamp: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutbreakFields {
    location: String,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    infected_count: u64,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    timestamp: u64,
}

/// Decode one wire row into a typed event.
pub fn decode_event(wire: &WireEvent) -> Result<RawEvent, LedgerError> {
    let kind = EventKind::from_wire_name(&wire.event)
        .ok_or_else(|| LedgerError::Decode(format!("unknown event: {}", wire.event)))?;

    let payload = match kind {
        EventKind::Infection => {
            let fields: InfectionFields = serde_json::from_value(wire.return_values.clone())
                .map_err(|e| LedgerError::Decode(format!("{}: {e}", wire.event)))?;
            EventPayload::Infection(InfectionReport {
                address: AccountId(fields.individual_address),
                location: Location(fields.location),
                observed_at: fields.timestamp,
            })
        }
        EventKind::OutbreakAlert => {
            let fields: OutbreakFields = serde_json::from_value(wire.return_values.clone())
                .map_err(|e| LedgerError::Decode(format!("{}: {e}", wire.event)))?;
            EventPayload::OutbreakAlert(OutbreakAlert {
                location: Location(fields.location),
                infected_count: fields.infected_count,
                observed_at: fields.timestamp,
            })
        }
    };

    Ok(RawEvent::new(wire.block_number, wire.log_index, payload))
}

/// Decode a batch, failing on the first malformed row.
pub fn decode_events(wire: &[WireEvent]) -> Result<Vec<RawEvent>, LedgerError> {
    wire.iter().map(decode_event).collect()
}
