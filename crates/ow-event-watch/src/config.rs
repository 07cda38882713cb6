//! # Watch Configuration
//!
//! Timing and capacity knobs for the event-notification subsystem.

use crate::domain::WatchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Watch configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Polling period for kinds in fallback mode, in milliseconds.
    pub poll_interval_ms: u64,

    /// How long to wait for a live subscription's `connected` signal before
    /// degrading the kind to polling, in milliseconds.
    pub live_connect_timeout_ms: u64,

    /// Blocks to look back when deriving the initial cursor on a cold start.
    pub lookback_blocks: u64,

    /// Capacity of the per-kind channel between subscriber and coordinator.
    pub live_channel_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            live_connect_timeout_ms: 5_000,
            lookback_blocks: 100,
            live_channel_capacity: 256,
        }
    }
}

impl WatchConfig {
    /// Create a config for testing (small timings).
    pub fn for_testing() -> Self {
        Self {
            poll_interval_ms: 20,
            live_connect_timeout_ms: 40,
            lookback_blocks: 10,
            live_channel_capacity: 16,
        }
    }

    /// Reject configurations the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.poll_interval_ms == 0 {
            return Err(WatchError::InvalidConfig(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.live_channel_capacity == 0 {
            return Err(WatchError::InvalidConfig(
                "live_channel_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Polling period as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Live connect window as a [`Duration`].
    #[must_use]
    pub fn live_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.live_connect_timeout_ms)
    }
}
