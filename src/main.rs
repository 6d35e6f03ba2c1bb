//! Crowd directory service for the restaurant discovery app
//!
//! Owns the venue catalog, the user fix and the derived crowd levels, and
//! keeps them fresh against either a local snapshot or the remote report
//! store.
//!
//! Module structure:
//! - `domain/` - Core business types and pure aggregation/geo logic
//! - `io/` - External interfaces (location provider, report store, files)
//! - `services/` - Business logic (LocationTracker, VenueDirectory)
//! - `infra/` - Infrastructure (Config)

use clap::Parser;
use eatrai_core::infra::{Config, StoreMode};
use eatrai_core::io::{
    load_or_seed, FixedLocationProvider, LocationProvider, RestReportStore, RestStoreConfig,
    TallySnapshot,
};
use eatrai_core::services::{LocationTracker, VenueDirectory};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Crowd directory service - venue catalog, proximity-gated crowd reports
#[derive(Parser, Debug)]
#[command(name = "eatrai-core", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, level configurable via RUST_LOG (default: info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git_hash = env!("GIT_HASH"), "eatrai-core starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    let mode_str = match config.store_mode() {
        StoreMode::Local => "local",
        StoreMode::Shared => "shared",
    };
    info!(
        config_file = %config.config_file(),
        catalog_file = %config.catalog_file(),
        store_mode = %mode_str,
        proximity_radius_m = %config.proximity_radius_m(),
        refresh_interval_secs = %config.refresh_interval_secs(),
        location_poll_secs = %config.location_poll_interval_secs(),
        "config_loaded"
    );

    let catalog = load_or_seed(config.catalog_file());

    // Without a configured position the tracker never gets a fix: distances
    // show the placeholder and report submission fails closed.
    let provider: Arc<dyn LocationProvider> = match config.static_position() {
        Some(position) => {
            info!(
                latitude = %position.latitude,
                longitude = %position.longitude,
                "location_static_position"
            );
            Arc::new(FixedLocationProvider::at(position))
        }
        None => {
            info!("location_not_configured");
            Arc::new(FixedLocationProvider::unavailable())
        }
    };
    let tracker = Arc::new(LocationTracker::new(&config, provider));

    let directory = match config.store_mode() {
        StoreMode::Shared => {
            let store = RestReportStore::new(&RestStoreConfig {
                base_url: config.store_base_url().to_string(),
                api_key: config.store_api_key().map(str::to_string),
                timeout_ms: config.store_timeout_ms(),
            })?;
            Arc::new(VenueDirectory::new_shared(
                &config,
                catalog,
                tracker.clone(),
                Arc::new(store),
            ))
        }
        StoreMode::Local => {
            let snapshot = TallySnapshot::new(config.snapshot_file());
            Arc::new(VenueDirectory::new_local(&config, catalog, tracker.clone(), snapshot))
        }
    };

    // Shutdown signal shared by every service loop
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let tracker_shutdown = shutdown_rx.clone();
    let tracker_task = tracker.clone();
    tokio::spawn(async move {
        tracker_task.run(tracker_shutdown).await;
    });

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_tx.send(true);
    });

    info!(venues = %directory.statuses().len(), "directory_started");

    // Refresh loop runs in the foreground until shutdown
    directory.run(shutdown_rx).await;

    info!("eatrai-core shutdown complete");
    Ok(())
}
