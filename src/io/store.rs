//! Report store boundary
//!
//! The remote report collection is append-only: clients insert
//! `{venue_id, level}` and the store assigns id and timestamp. Queries are
//! scoped to one venue and a lower time bound; aggregation happens on
//! whatever subset comes back.

use crate::domain::types::{CrowdLevel, CrowdReport, VenueId};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// Append-only crowd report collection, keyed by venue
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Reports for `venue_id` created strictly after `since`
    async fn reports_since(
        &self,
        venue_id: &VenueId,
        since: DateTime<Utc>,
    ) -> Result<Vec<CrowdReport>>;

    /// Insert a new report; returns the stored row with assigned id and
    /// timestamp
    async fn insert_report(&self, venue_id: &VenueId, level: CrowdLevel) -> Result<CrowdReport>;
}

/// In-process store for tests and simulation
///
/// Assigns UUIDv7 ids and wall-clock timestamps on insert. `seed` lets
/// callers plant reports at explicit past timestamps.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<CrowdReport>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plant a report with an explicit timestamp
    pub fn seed(&self, venue_id: &VenueId, level: CrowdLevel, created_at: DateTime<Utc>) {
        let report = CrowdReport {
            id: Uuid::now_v7().to_string(),
            venue_id: venue_id.clone(),
            level,
            created_at,
        };
        self.reports.lock().push(report);
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn reports_since(
        &self,
        venue_id: &VenueId,
        since: DateTime<Utc>,
    ) -> Result<Vec<CrowdReport>> {
        let reports = self.reports.lock();
        Ok(reports
            .iter()
            .filter(|r| &r.venue_id == venue_id && r.created_at > since)
            .cloned()
            .collect())
    }

    async fn insert_report(&self, venue_id: &VenueId, level: CrowdLevel) -> Result<CrowdReport> {
        let report = CrowdReport {
            id: Uuid::now_v7().to_string(),
            venue_id: venue_id.clone(),
            level,
            created_at: Utc::now(),
        };
        self.reports.lock().push(report.clone());
        Ok(report)
    }
}
