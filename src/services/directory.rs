//! Venue directory service
//!
//! Owns the venue list and its derived crowd levels, accepts
//! proximity-gated crowd reports and refreshes the levels periodically.
//! Two aggregation modes:
//! - local: per-venue counts, snapshot-persisted, decayed on refresh
//! - shared: reports pulled from the remote store, time-weighted
//!
//! The shared-mode view is never patched incrementally; every refresh
//! re-derives levels from what the store returned, so a failed submit or
//! poll can never leave a diverged local state behind.

use crate::domain::crowd::{
    decay_tally, level_from_counts, level_from_reports, weighted_tally, REPORT_EXPIRY_MINUTES,
};
use crate::domain::geo::{format_distance, haversine_distance_m, DISTANCE_PLACEHOLDER};
use crate::domain::types::{
    CrowdLevel, CrowdReport, CrowdTally, GeoPoint, ReportRejection, VenueId, WeightedTally,
};
use crate::domain::venue::Venue;
use crate::infra::config::{Config, StoreMode};
use crate::io::snapshot::TallySnapshot;
use crate::io::store::ReportStore;
use crate::services::location::LocationTracker;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

/// Point-in-time view of one venue, for display
#[derive(Debug, Clone)]
pub struct VenueStatus {
    pub venue: Venue,
    pub level: CrowdLevel,
    pub tally: CrowdTally,
    /// Decayed sums behind the level; shared mode only, None until the
    /// first refresh
    pub weighted: Option<WeightedTally>,
    pub distance_m: Option<f64>,
}

impl VenueStatus {
    /// Distance as a short human string, placeholder when no fix exists
    pub fn formatted_distance(&self) -> String {
        match self.distance_m {
            Some(meters) => format_distance(meters),
            None => DISTANCE_PLACEHOLDER.to_string(),
        }
    }
}

struct VenueState {
    venue: Venue,
    tally: CrowdTally,
    weighted: Option<WeightedTally>,
    level: CrowdLevel,
}

/// Mode-specific collaborators; local mode persists, shared mode polls
enum Backend {
    Local { snapshot: TallySnapshot },
    Shared { store: Arc<dyn ReportStore> },
}

pub struct VenueDirectory {
    proximity_radius_m: f64,
    refresh_interval: Duration,
    tracker: Arc<LocationTracker>,
    backend: Backend,
    venues: RwLock<Vec<VenueState>>,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
}

impl VenueDirectory {
    /// Local mode: counts live in memory, persisted to the snapshot file
    pub fn new_local(
        config: &Config,
        catalog: Vec<Venue>,
        tracker: Arc<LocationTracker>,
        snapshot: TallySnapshot,
    ) -> Self {
        let stored = snapshot.load();
        let venues = catalog
            .into_iter()
            .map(|venue| {
                // Snapshot entries for venues no longer in the catalog are
                // simply never looked up
                let tally = stored.get(&venue.id).copied().unwrap_or(venue.seed_tally);
                let level = level_from_counts(&tally);
                VenueState { venue, tally, weighted: None, level }
            })
            .collect();

        Self {
            proximity_radius_m: config.proximity_radius_m(),
            refresh_interval: Duration::from_secs(config.refresh_interval_secs()),
            tracker,
            backend: Backend::Local { snapshot },
            venues: RwLock::new(venues),
            last_refresh: RwLock::new(None),
        }
    }

    /// Shared mode: levels derive from the remote report collection
    ///
    /// Seed tallies provide the display level until the first refresh.
    pub fn new_shared(
        config: &Config,
        catalog: Vec<Venue>,
        tracker: Arc<LocationTracker>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        let venues = catalog
            .into_iter()
            .map(|venue| {
                let tally = venue.seed_tally;
                let level = level_from_counts(&tally);
                VenueState { venue, tally, weighted: None, level }
            })
            .collect();

        Self {
            proximity_radius_m: config.proximity_radius_m(),
            refresh_interval: Duration::from_secs(config.refresh_interval_secs()),
            tracker,
            backend: Backend::Shared { store },
            venues: RwLock::new(venues),
            last_refresh: RwLock::new(None),
        }
    }

    pub fn mode(&self) -> StoreMode {
        match self.backend {
            Backend::Local { .. } => StoreMode::Local,
            Backend::Shared { .. } => StoreMode::Shared,
        }
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.read()
    }

    fn find_venue(&self, venue_id: &VenueId) -> Option<Venue> {
        self.venues.read().iter().find(|s| &s.venue.id == venue_id).map(|s| s.venue.clone())
    }

    /// Submit a crowd report for a venue
    ///
    /// The gate fails closed: no resolvable location means no report, and
    /// a rejection leaves every piece of state untouched.
    pub async fn submit_report(
        &self,
        venue_id: &VenueId,
        level: CrowdLevel,
    ) -> Result<CrowdReport, ReportRejection> {
        let Some(venue) = self.find_venue(venue_id) else {
            info!(venue_id = %venue_id, reason = "unknown_venue", "report_rejected");
            return Err(ReportRejection::UnknownVenue);
        };

        let Some(user) = self.tracker.current_or_refresh().await else {
            info!(venue_id = %venue_id, reason = "location_unavailable", "report_rejected");
            return Err(ReportRejection::LocationUnavailable);
        };

        let distance_m = haversine_distance_m(user, venue.position());
        if distance_m > self.proximity_radius_m {
            info!(
                venue_id = %venue_id,
                distance_m = %(distance_m as u64),
                radius_m = %(self.proximity_radius_m as u64),
                reason = "out_of_range",
                "report_rejected"
            );
            return Err(ReportRejection::OutOfRange { distance_m });
        }

        let report = match &self.backend {
            Backend::Shared { store } => self.submit_shared(store.as_ref(), venue_id, level).await?,
            Backend::Local { snapshot } => self.submit_local(snapshot, venue_id, level),
        };

        info!(
            venue_id = %venue_id,
            level = %level,
            report_id = %report.id,
            distance_m = %(distance_m as u64),
            "report_accepted"
        );
        Ok(report)
    }

    async fn submit_shared(
        &self,
        store: &dyn ReportStore,
        venue_id: &VenueId,
        level: CrowdLevel,
    ) -> Result<CrowdReport, ReportRejection> {
        match store.insert_report(venue_id, level).await {
            Ok(report) => Ok(report),
            Err(e) => {
                // The local view is left alone; the next successful
                // refresh remains the single source of derived state.
                warn!(venue_id = %venue_id, error = %e, "report_insert_failed");
                Err(ReportRejection::StoreUnavailable)
            }
        }
    }

    fn submit_local(
        &self,
        snapshot: &TallySnapshot,
        venue_id: &VenueId,
        level: CrowdLevel,
    ) -> CrowdReport {
        {
            let mut venues = self.venues.write();
            if let Some(state) = venues.iter_mut().find(|s| &s.venue.id == venue_id) {
                state.tally.bump(level);
                state.level = level_from_counts(&state.tally);
            }
        }
        self.persist_snapshot(snapshot);

        CrowdReport {
            id: Uuid::now_v7().to_string(),
            venue_id: venue_id.clone(),
            level,
            created_at: Utc::now(),
        }
    }

    fn persist_snapshot(&self, snapshot: &TallySnapshot) {
        let tallies: HashMap<VenueId, CrowdTally> =
            self.venues.read().iter().map(|s| (s.venue.id.clone(), s.tally)).collect();
        // Write failure already logged; in-memory tallies stay authoritative
        snapshot.store(&tallies);
    }

    /// Re-derive all crowd levels
    ///
    /// Shared mode polls the store per venue; local mode applies one decay
    /// tick to every tally.
    pub async fn refresh(&self) {
        let now = Utc::now();
        match &self.backend {
            Backend::Shared { store } => self.refresh_shared(store.as_ref(), now).await,
            Backend::Local { snapshot } => self.refresh_local(snapshot),
        }
        *self.last_refresh.write() = Some(now);
    }

    async fn refresh_shared(&self, store: &dyn ReportStore, now: DateTime<Utc>) {
        let cutoff = now - ChronoDuration::minutes(REPORT_EXPIRY_MINUTES as i64);

        let venue_ids: Vec<VenueId> =
            self.venues.read().iter().map(|s| s.venue.id.clone()).collect();

        let mut failures = 0usize;
        for venue_id in &venue_ids {
            match store.reports_since(venue_id, cutoff).await {
                Ok(reports) => {
                    let weighted = weighted_tally(&reports, now);
                    let level = level_from_reports(&reports, now);
                    let mut venues = self.venues.write();
                    if let Some(state) = venues.iter_mut().find(|s| &s.venue.id == venue_id) {
                        state.weighted = Some(weighted);
                        state.level = level;
                    }
                }
                Err(e) => {
                    // Keep the previous level; a poll failure must not
                    // blank out the display
                    failures += 1;
                    warn!(venue_id = %venue_id, error = %e, "venue_refresh_failed");
                }
            }
        }

        info!(
            venues = %venue_ids.len(),
            failures = %failures,
            mode = "shared",
            "crowd_data_refreshed"
        );
    }

    fn refresh_local(&self, snapshot: &TallySnapshot) {
        {
            let mut venues = self.venues.write();
            for state in venues.iter_mut() {
                state.tally = decay_tally(&state.tally);
                state.level = level_from_counts(&state.tally);
            }
        }
        self.persist_snapshot(snapshot);

        info!(venues = %self.venues.read().len(), mode = "local", "crowd_data_refreshed");
    }

    /// Meters from the cached user fix to the venue
    pub fn distance_to(&self, venue_id: &VenueId) -> Option<f64> {
        let venue = self.find_venue(venue_id)?;
        let user = self.tracker.current()?;
        Some(haversine_distance_m(user, venue.position()))
    }

    /// Distance as a short human string, placeholder without a fix
    pub fn formatted_distance(&self, venue_id: &VenueId) -> String {
        match self.distance_to(venue_id) {
            Some(meters) => format_distance(meters),
            None => DISTANCE_PLACEHOLDER.to_string(),
        }
    }

    /// Current view of every venue, in catalog order
    pub fn statuses(&self) -> Vec<VenueStatus> {
        let user = self.tracker.current();
        self.venues
            .read()
            .iter()
            .map(|state| self.status_of(state, user))
            .collect()
    }

    /// Current view of one venue
    pub fn status(&self, venue_id: &VenueId) -> Option<VenueStatus> {
        let user = self.tracker.current();
        let venues = self.venues.read();
        venues.iter().find(|s| &s.venue.id == venue_id).map(|state| self.status_of(state, user))
    }

    fn status_of(&self, state: &VenueState, user: Option<GeoPoint>) -> VenueStatus {
        let distance_m = user.map(|u| haversine_distance_m(u, state.venue.position()));
        VenueStatus {
            venue: state.venue.clone(),
            level: state.level,
            tally: state.tally,
            weighted: state.weighted,
            distance_m,
        }
    }

    /// Refresh crowd data until shutdown
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.refresh_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("directory_shutdown");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.refresh().await;
                }
            }
        }
    }
}
