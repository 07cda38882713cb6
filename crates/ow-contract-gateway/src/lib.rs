//! # Contract Gateway
//!
//! The typed surface of the outbreak-tracking contract: read queries and
//! fire-and-forget writes over an untyped call/send port.
//!
//! The gateway owns all decoding. Node responses arrive as JSON values —
//! positional tuples from some providers, field maps from others — and
//! leave this crate as typed structs; callers never touch the raw shapes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod ports;
pub mod types;

pub use client::OutbreakContract;
pub use ports::{ContractGateway, MockContractGateway};
pub use types::{ExposureRisk, GatewayError, OutbreakLocation, ProximityCheck};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
