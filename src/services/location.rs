//! Location tracking service
//!
//! Polls the injected provider on a fixed interval and caches the latest
//! fix. Readers never block on the device: `current()` returns whatever
//! fix is cached, and `current_or_refresh()` performs a one-shot provider
//! query only when there is no cached fix at all.

use crate::domain::geo::haversine_distance_m;
use crate::domain::types::GeoPoint;
use crate::infra::config::Config;
use crate::io::location::LocationProvider;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct LocationTracker {
    provider: Arc<dyn LocationProvider>,
    fix: RwLock<Option<GeoPoint>>,
    poll_interval: Duration,
    /// Movement below this threshold is not worth a log line
    min_move_m: f64,
}

impl LocationTracker {
    pub fn new(config: &Config, provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            fix: RwLock::new(None),
            poll_interval: Duration::from_secs(config.location_poll_interval_secs()),
            min_move_m: config.location_min_move_m(),
        }
    }

    /// Latest cached fix, if any
    pub fn current(&self) -> Option<GeoPoint> {
        *self.fix.read()
    }

    /// Cached fix, or a one-shot provider query when none is cached
    ///
    /// Returns None when no fix exists and the provider cannot produce
    /// one - callers treat that as "no location" and refuse gated actions.
    pub async fn current_or_refresh(&self) -> Option<GeoPoint> {
        if let Some(fix) = self.current() {
            return Some(fix);
        }

        match self.provider.current_position().await {
            Ok(position) => {
                self.update_fix(position);
                Some(position)
            }
            Err(e) => {
                warn!(error = %e, "location_fix_unavailable");
                None
            }
        }
    }

    fn update_fix(&self, position: GeoPoint) {
        let mut fix = self.fix.write();
        match *fix {
            None => {
                info!(
                    latitude = %position.latitude,
                    longitude = %position.longitude,
                    "location_first_fix"
                );
            }
            Some(previous) => {
                let moved_m = haversine_distance_m(previous, position);
                if moved_m >= self.min_move_m {
                    debug!(
                        latitude = %position.latitude,
                        longitude = %position.longitude,
                        moved_m = %(moved_m as u64),
                        "location_fix_updated"
                    );
                }
            }
        }
        *fix = Some(position);
    }

    /// Poll the provider until shutdown
    ///
    /// Provider errors leave the previous fix in place; the cache only
    /// ever moves forward to a newer successful fix.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("location_tracker_shutdown");
                        return;
                    }
                }
                _ = interval.tick() => {
                    match self.provider.current_position().await {
                        Ok(position) => self.update_fix(position),
                        Err(e) => debug!(error = %e, "location_poll_failed"),
                    }
                }
            }
        }
    }
}
