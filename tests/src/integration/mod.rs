//! Cross-crate integration scenarios.

pub mod gateway_flows;
pub mod watch_scenarios;
