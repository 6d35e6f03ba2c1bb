//! End-to-end tests for the venue directory over the in-memory store

use chrono::{Duration, Utc};
use eatrai_core::domain::types::{CrowdLevel, CrowdTally, GeoPoint, ReportRejection, VenueId};
use eatrai_core::infra::Config;
use eatrai_core::io::{seed_catalog, FixedLocationProvider, MemoryReportStore, TallySnapshot};
use eatrai_core::services::{LocationTracker, VenueDirectory};
use std::sync::Arc;
use tempfile::tempdir;

/// Campus center; venue 6 is within the 500 m radius, venue 8 is not
fn campus() -> GeoPoint {
    GeoPoint::new(14.0205, 99.9870)
}

fn tracker_at(position: GeoPoint) -> Arc<LocationTracker> {
    Arc::new(LocationTracker::new(
        &Config::default(),
        Arc::new(FixedLocationProvider::at(position)),
    ))
}

#[tokio::test]
async fn test_shared_mode_end_to_end() {
    let store = Arc::new(MemoryReportStore::new());
    let now = Utc::now();

    // Fresh busy against almost-expired quiet: busy must win on weights
    let venue_one = VenueId::from("1");
    store.seed(&venue_one, CrowdLevel::Busy, now - Duration::minutes(5));
    store.seed(&venue_one, CrowdLevel::Quiet, now - Duration::minutes(28));

    // Only expired reports: quiet default
    let venue_three = VenueId::from("3");
    store.seed(&venue_three, CrowdLevel::Busy, now - Duration::minutes(35));
    store.seed(&venue_three, CrowdLevel::Busy, now - Duration::minutes(50));

    let directory = VenueDirectory::new_shared(
        &Config::default(),
        seed_catalog(),
        tracker_at(campus()),
        store.clone(),
    );

    directory.refresh().await;

    let status_one = directory.status(&venue_one).unwrap();
    assert_eq!(status_one.level, CrowdLevel::Busy);
    let weighted = status_one.weighted.unwrap();
    assert!((weighted.busy - 0.8333).abs() < 1e-2, "busy score {}", weighted.busy);
    assert!((weighted.quiet - 0.0667).abs() < 1e-2, "quiet score {}", weighted.quiet);

    let status_three = directory.status(&venue_three).unwrap();
    assert_eq!(status_three.level, CrowdLevel::Quiet);

    // Untouched venues also land on the empty-set default after refresh
    assert_eq!(directory.status(&VenueId::from("10")).unwrap().level, CrowdLevel::Quiet);
}

#[tokio::test]
async fn test_shared_mode_submit_then_refresh_moves_the_level() {
    let store = Arc::new(MemoryReportStore::new());
    let directory = VenueDirectory::new_shared(
        &Config::default(),
        seed_catalog(),
        tracker_at(campus()),
        store.clone(),
    );

    // Venue 6 is inside the radius from the campus center
    let venue_id = VenueId::from("6");
    for _ in 0..3 {
        directory.submit_report(&venue_id, CrowdLevel::Busy).await.unwrap();
    }
    assert_eq!(store.len(), 3);

    // Submission alone does not touch the derived view
    assert_ne!(directory.status(&venue_id).unwrap().level, CrowdLevel::Busy);

    directory.refresh().await;
    assert_eq!(directory.status(&venue_id).unwrap().level, CrowdLevel::Busy);
}

#[tokio::test]
async fn test_proximity_gate_across_the_catalog() {
    let store = Arc::new(MemoryReportStore::new());
    let directory = VenueDirectory::new_shared(
        &Config::default(),
        seed_catalog(),
        tracker_at(campus()),
        store.clone(),
    );

    // Venue 8 is ~1.4 km from the campus center
    let result = directory.submit_report(&VenueId::from("8"), CrowdLevel::Quiet).await;
    match result {
        Err(ReportRejection::OutOfRange { distance_m }) => assert!(distance_m > 1000.0),
        other => panic!("expected out-of-range, got {other:?}"),
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_local_mode_report_and_restart_cycle() {
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("crowd_reports.json");
    let config = Config::default();

    {
        let snapshot = TallySnapshot::new(snapshot_path.to_str().unwrap());
        let directory = VenueDirectory::new_local(
            &config,
            seed_catalog(),
            tracker_at(campus()),
            snapshot,
        );

        let venue_id = VenueId::from("6");
        directory.submit_report(&venue_id, CrowdLevel::Moderate).await.unwrap();

        // Seed {5,6,4} plus one moderate
        assert_eq!(
            directory.status(&venue_id).unwrap().tally,
            CrowdTally::new(5, 7, 4)
        );
    }

    // Restart: the snapshot carries the counts over
    let snapshot = TallySnapshot::new(snapshot_path.to_str().unwrap());
    let directory =
        VenueDirectory::new_local(&config, seed_catalog(), tracker_at(campus()), snapshot);
    assert_eq!(
        directory.status(&VenueId::from("6")).unwrap().tally,
        CrowdTally::new(5, 7, 4)
    );

    // One refresh tick decays every bucket
    directory.refresh().await;
    assert_eq!(
        directory.status(&VenueId::from("6")).unwrap().tally,
        CrowdTally::new(4, 5, 3)
    );
}

#[tokio::test]
async fn test_no_fix_means_placeholder_and_closed_gate() {
    let store = Arc::new(MemoryReportStore::new());
    let tracker = Arc::new(LocationTracker::new(
        &Config::default(),
        Arc::new(FixedLocationProvider::unavailable()),
    ));
    let directory =
        VenueDirectory::new_shared(&Config::default(), seed_catalog(), tracker, store.clone());

    for status in directory.statuses() {
        assert_eq!(status.formatted_distance(), "-- m");
    }

    let result = directory.submit_report(&VenueId::from("6"), CrowdLevel::Busy).await;
    assert_eq!(result.unwrap_err(), ReportRejection::LocationUnavailable);
    assert!(store.is_empty());
}
