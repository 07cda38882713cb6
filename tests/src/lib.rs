//! # Outbreak-Watch Test Suite
//!
//! Unified test crate for cross-crate scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── watch_scenarios.rs   # Delivery guarantees across mode switches
//!     └── gateway_flows.rs     # Typed contract client flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All scenarios
//! cargo test -p ow-tests
//!
//! # By category
//! cargo test -p ow-tests integration::watch_scenarios::
//! cargo test -p ow-tests integration::gateway_flows::
//! ```

pub mod integration;
