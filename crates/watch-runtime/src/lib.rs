//! # Outbreak-Watch Runtime
//!
//! Wiring for the client binary: runtime configuration, the logging sink
//! the watch delivers into, and the simulated contract feed the demo runs
//! against.

#![warn(missing_docs)]

use chrono::DateTime;
use ow_event_watch::{MemoryLedgerNode, NotificationSink, WatchConfig};
use rand::Rng;
use shared_types::{AccountId, EventPayload, InfectionReport, Location, OutbreakAlert};
use std::env;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tracing::{info, warn};

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Chain height the simulated ledger starts at.
    pub start_height: u64,
    /// Block production period of the simulated ledger, in milliseconds.
    pub block_interval_ms: u64,
    /// Watch-core timing knobs.
    pub watch: WatchConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            start_height: 100,
            block_interval_ms: 2_000,
            watch: WatchConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OW_START_HEIGHT`: Initial simulated chain height (default: 100)
    /// - `OW_BLOCK_INTERVAL_MS`: Simulated block period (default: 2000)
    /// - `OW_POLL_INTERVAL_MS`: Fallback polling period (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut watch = defaults.watch;
        if let Some(poll_interval_ms) = env_u64("OW_POLL_INTERVAL_MS") {
            watch.poll_interval_ms = poll_interval_ms;
        }
        Self {
            start_height: env_u64("OW_START_HEIGHT").unwrap_or(defaults.start_height),
            block_interval_ms: env_u64("OW_BLOCK_INTERVAL_MS")
                .unwrap_or(defaults.block_interval_ms),
            watch,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Sink that renders every notification as a log line.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn on_infection(&self, report: InfectionReport) {
        info!(
            address = %report.address,
            location = %report.location,
            observed_at = %format_timestamp(report.observed_at),
            "New infection reported"
        );
    }

    fn on_outbreak_alert(&self, alert: OutbreakAlert) {
        warn!(
            location = %alert.location,
            infected_count = alert.infected_count,
            observed_at = %format_timestamp(alert.observed_at),
            "Potential outbreak detected"
        );
    }
}

/// Render a contract timestamp for humans; fall back to the raw seconds
/// when it is out of range.
#[must_use]
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(|| secs.to_string(), |dt| dt.to_rfc3339())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

const DEMO_LOCATIONS: [&str; 4] = [
    "35.6895,139.6917",
    "40.7128,-74.0060",
    "48.8566,2.3522",
    "-23.5505,-46.6333",
];

/// Drive the simulated ledger: one block per tick, with occasional
/// infection reports and rarer outbreak alerts.
pub async fn run_demo_feed(
    node: Arc<MemoryLedgerNode>,
    config: RuntimeConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(config.block_interval_ms));
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let height = node.produce_block();
                let mut rng = rand::thread_rng();
                if rng.gen_bool(0.6) {
                    let location = DEMO_LOCATIONS[rng.gen_range(0..DEMO_LOCATIONS.len())];
                    node.record_event(EventPayload::Infection(InfectionReport {
                        address: AccountId(format!("0x{:040x}", rng.gen::<u64>())),
                        location: Location(location.into()),
                        observed_at: unix_now(),
                    }));
                }
                if rng.gen_bool(0.15) {
                    let location = DEMO_LOCATIONS[rng.gen_range(0..DEMO_LOCATIONS.len())];
                    node.record_event(EventPayload::OutbreakAlert(OutbreakAlert {
                        location: Location(location.into()),
                        infected_count: rng.gen_range(3..12),
                        observed_at: unix_now(),
                    }));
                }
                tracing::trace!(height, "Produced simulated block");
            }
        }
    }
    info!("Demo feed stopped");
}
