//! Offline crowd simulation - seeds a memory store and prints the
//! resulting venue table
//!
//! Exercises the full shared-mode path (store query, time-decayed
//! aggregation, proximity gate, distance formatting) without any network
//! or device dependency. Useful for eyeballing the decay behavior:
//!
//!   cargo run --bin crowd-sim
//!   cargo run --bin crowd-sim -- --latitude 14.0174 --longitude 99.9927

use chrono::{Duration, Utc};
use clap::Parser;
use eatrai_core::domain::types::{CrowdLevel, GeoPoint, VenueId};
use eatrai_core::infra::Config;
use eatrai_core::io::{seed_catalog, FixedLocationProvider, MemoryReportStore};
use eatrai_core::services::{LocationTracker, VenueDirectory};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crowd-sim")]
#[command(about = "Seed synthetic crowd reports and print the venue table")]
struct Args {
    /// Simulated user latitude
    #[arg(long, default_value_t = 14.0205)]
    latitude: f64,

    /// Simulated user longitude
    #[arg(long, default_value_t = 99.9870)]
    longitude: f64,
}

/// Synthetic reports: (venue id, level, age in minutes)
const SCENARIO: &[(&str, CrowdLevel, i64)] = &[
    // Fresh busy beats an almost-expired quiet
    ("1", CrowdLevel::Busy, 5),
    ("1", CrowdLevel::Quiet, 28),
    // Quiet majority with some age spread
    ("2", CrowdLevel::Quiet, 2),
    ("2", CrowdLevel::Quiet, 12),
    ("2", CrowdLevel::Moderate, 20),
    // Everything expired: falls back to Quiet
    ("3", CrowdLevel::Busy, 31),
    ("3", CrowdLevel::Busy, 45),
    // Balanced fresh reports: busy wins the tie
    ("4", CrowdLevel::Quiet, 3),
    ("4", CrowdLevel::Moderate, 3),
    ("4", CrowdLevel::Busy, 3),
];

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();
    let user = GeoPoint::new(args.latitude, args.longitude);

    let store = Arc::new(MemoryReportStore::new());
    let now = Utc::now();
    for (venue_id, level, age_minutes) in SCENARIO {
        store.seed(&VenueId::from(*venue_id), *level, now - Duration::minutes(*age_minutes));
    }

    let config = Config::default();
    let tracker =
        Arc::new(LocationTracker::new(&config, Arc::new(FixedLocationProvider::at(user))));
    let directory =
        VenueDirectory::new_shared(&config, seed_catalog(), tracker.clone(), store.clone());

    // Prime the fix and derive levels from the seeded store
    tracker.current_or_refresh().await;
    directory.refresh().await;

    println!("user position: {:.4}, {:.4}", user.latitude, user.longitude);
    println!("seeded reports: {}", store.len());
    println!();
    println!(
        "{:<4} {:<24} {:<10} {:>7} {:>9} {:>7} {:>10}",
        "id", "name", "level", "quiet", "moderate", "busy", "distance"
    );

    for status in directory.statuses() {
        let weighted = status.weighted.unwrap_or_default();
        println!(
            "{:<4} {:<24} {:<10} {:>7.3} {:>9.3} {:>7.3} {:>10}",
            status.venue.id.as_str(),
            status.venue.name,
            status.level.label(),
            weighted.quiet,
            weighted.moderate,
            weighted.busy,
            status.formatted_distance(),
        );
    }

    // Try the gate from both sides of the radius: venue 6 is ~330 m from
    // the default user position, venue 8 ~1.4 km
    println!();
    for venue_id in ["6", "8"] {
        let venue_id = VenueId::from(venue_id);
        match directory.submit_report(&venue_id, CrowdLevel::Moderate).await {
            Ok(report) => println!("report to venue {}: accepted ({})", venue_id, report.id),
            Err(rejection) => println!("report to venue {}: rejected ({})", venue_id, rejection),
        }
    }
}
