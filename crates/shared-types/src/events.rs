//! # Contract Event Model
//!
//! The closed set of events the outbreak-tracking contract emits, in both
//! raw (ledger-attributed) and notification (application-facing) form.
//!
//! The ledger delivers events as untyped field maps; the watch core's codec
//! decodes them into [`EventPayload`] exactly once, at the boundary.

use crate::entities::{AccountId, BlockHeight, Location};
use serde::{Deserialize, Serialize};

/// The observable event kinds, fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An individual tested positive and was recorded on-ledger.
    Infection,
    /// A location crossed the contract's outbreak threshold.
    OutbreakAlert,
}

impl EventKind {
    /// Every kind, in declaration order. Useful for "watch everything".
    pub const ALL: [EventKind; 2] = [EventKind::Infection, EventKind::OutbreakAlert];

    /// The event name as the contract ABI declares it.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            EventKind::Infection => "NewInfection",
            EventKind::OutbreakAlert => "PotentialOutbreak",
        }
    }

    /// Reverse lookup from the ABI event name.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "NewInfection" => Some(EventKind::Infection),
            "PotentialOutbreak" => Some(EventKind::OutbreakAlert),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A reported infection, as emitted by the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfectionReport {
    /// The individual the report concerns.
    pub address: AccountId,
    /// Where the infection was recorded.
    pub location: Location,
    /// Contract-side unix timestamp (seconds).
    pub observed_at: u64,
}

/// An outbreak alert, as emitted by the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutbreakAlert {
    /// The location that crossed the threshold.
    pub location: Location,
    /// Number of infections recorded at that location.
    pub infected_count: u64,
    /// Contract-side unix timestamp (seconds).
    pub observed_at: u64,
}

/// Typed payload of a single contract event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Payload of a [`EventKind::Infection`] event.
    Infection(InfectionReport),
    /// Payload of a [`EventKind::OutbreakAlert`] event.
    OutbreakAlert(OutbreakAlert),
}

impl EventPayload {
    /// The kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Infection(_) => EventKind::Infection,
            EventPayload::OutbreakAlert(_) => EventKind::OutbreakAlert,
        }
    }
}

/// One event as attributed on the ledger. Immutable once constructed.
///
/// `source_index` disambiguates multiple events of the same kind inside one
/// block; together with `block_height` it orders a block range totally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Which event this is. Always consistent with the payload.
    pub kind: EventKind,
    /// Block the event was emitted in.
    pub block_height: BlockHeight,
    /// Emission order within the block.
    pub source_index: u32,
    /// The decoded, kind-specific fields.
    pub payload: EventPayload,
}

impl RawEvent {
    /// Build an event; the kind is derived from the payload so the two can
    /// never disagree.
    #[must_use]
    pub fn new(block_height: BlockHeight, source_index: u32, payload: EventPayload) -> Self {
        Self {
            kind: payload.kind(),
            block_height,
            source_index,
            payload,
        }
    }

    /// Total order of events within a block range.
    #[must_use]
    pub fn ordering_key(&self) -> (BlockHeight, u32) {
        (self.block_height, self.source_index)
    }
}
