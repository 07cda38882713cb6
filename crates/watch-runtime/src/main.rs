//! # Outbreak-Watch Client Runtime
//!
//! The main entry point. Startup sequence:
//!
//! 1. Initialize telemetry (structured logging)
//! 2. Load configuration from the environment
//! 3. Connect the ledger (the demo runs an in-process simulated node)
//! 4. Start the event watch over every kind, delivering into the log sink
//! 5. Run until ctrl-c, then tear everything down

use anyhow::{Context, Result};
use ow_event_watch::{EventWatch, MemoryLedgerNode};
use ow_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::EventKind;
use std::sync::Arc;
use tracing::info;
use watch_runtime::{run_demo_feed, LogSink, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env();
    info!(
        start_height = config.start_height,
        block_interval_ms = config.block_interval_ms,
        poll_interval_ms = config.watch.poll_interval_ms,
        "Starting Outbreak-Watch client"
    );

    let node = Arc::new(MemoryLedgerNode::new(config.start_height));
    let sink = Arc::new(LogSink);

    let handle = EventWatch::start(
        config.watch.clone(),
        node.clone(),
        &EventKind::ALL,
        sink,
    )
    .await
    .context("failed to start event watch")?;

    let (feed_shutdown_tx, feed_shutdown_rx) = tokio::sync::watch::channel(false);
    let feed = tokio::spawn(run_demo_feed(
        Arc::clone(&node),
        config.clone(),
        feed_shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("Shutdown requested");

    let _ = feed_shutdown_tx.send(true);
    handle.stop();
    feed.await.context("demo feed task failed")?;

    Ok(())
}
