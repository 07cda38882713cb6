//! # Shared Types Crate
//!
//! This crate contains the domain entities and the contract event model
//! shared across the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-crate type is defined here.
//! - **Typed payloads**: event payloads are decoded once at the ledger
//!   boundary into the enums in [`events`]; no other crate inspects
//!   untyped maps.
//! - **Closed event set**: [`events::EventKind`] is a compile-time enum, so
//!   an unknown kind is a decode error, never a runtime string mismatch.

pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::*;
pub use events::*;
