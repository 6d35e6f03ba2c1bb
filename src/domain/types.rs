//! Shared types for the crowd directory core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Newtype wrapper for venue IDs to provide type safety
///
/// IDs come from the venue catalog and the remote report store; they are
/// opaque strings, not numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(pub String);

impl VenueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VenueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VenueId {
    fn from(s: &str) -> Self {
        VenueId(s.to_string())
    }
}

/// Categorical busyness signal for a venue
///
/// Ordered by "business energy": Quiet < Moderate < Busy. The ordering is
/// used for display sorting only, never by the aggregation math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrowdLevel {
    Quiet,
    Moderate,
    Busy,
}

impl CrowdLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrowdLevel::Quiet => "quiet",
            CrowdLevel::Moderate => "moderate",
            CrowdLevel::Busy => "busy",
        }
    }

    /// Human-facing label (catalog casing)
    pub fn label(&self) -> &'static str {
        match self {
            CrowdLevel::Quiet => "Quiet",
            CrowdLevel::Moderate => "Moderate",
            CrowdLevel::Busy => "Busy",
        }
    }
}

impl std::fmt::Display for CrowdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CrowdLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(CrowdLevel::Quiet),
            "moderate" => Ok(CrowdLevel::Moderate),
            "busy" => Ok(CrowdLevel::Busy),
            other => Err(format!("unknown crowd level: {other}")),
        }
    }
}

/// Per-venue report counts, one bucket per crowd level
///
/// Used by the local aggregation mode and persisted in the tally snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrowdTally {
    pub quiet: u32,
    pub moderate: u32,
    pub busy: u32,
}

impl CrowdTally {
    pub fn new(quiet: u32, moderate: u32, busy: u32) -> Self {
        Self { quiet, moderate, busy }
    }

    /// Add one report to the matching bucket
    pub fn bump(&mut self, level: CrowdLevel) {
        match level {
            CrowdLevel::Quiet => self.quiet += 1,
            CrowdLevel::Moderate => self.moderate += 1,
            CrowdLevel::Busy => self.busy += 1,
        }
    }

    pub fn count(&self, level: CrowdLevel) -> u32 {
        match level {
            CrowdLevel::Quiet => self.quiet,
            CrowdLevel::Moderate => self.moderate,
            CrowdLevel::Busy => self.busy,
        }
    }

    pub fn total(&self) -> u32 {
        self.quiet + self.moderate + self.busy
    }
}

/// Decayed report weights, one bucket per crowd level
///
/// Floating-point counterpart of [`CrowdTally`] produced by the
/// time-weighted aggregation. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedTally {
    pub quiet: f64,
    pub moderate: f64,
    pub busy: f64,
}

impl WeightedTally {
    /// Add a report's decay weight to the matching bucket
    pub fn add(&mut self, level: CrowdLevel, weight: f64) {
        match level {
            CrowdLevel::Quiet => self.quiet += weight,
            CrowdLevel::Moderate => self.moderate += weight,
            CrowdLevel::Busy => self.busy += weight,
        }
    }
}

/// A WGS84 coordinate pair, used for both user and venue positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A single crowd report, as stored by the remote report collection
///
/// Immutable once created. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdReport {
    pub id: String,
    pub venue_id: VenueId,
    pub level: CrowdLevel,
    pub created_at: DateTime<Utc>,
}

/// Why a report submission was refused
///
/// Expected domain outcomes, not errors: the caller surfaces these to the
/// user and nothing in local state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRejection {
    /// No cached fix and a fresh one could not be obtained. Fails closed:
    /// absence of a location is never permission to report.
    LocationUnavailable,
    /// User is outside the reporting radius
    OutOfRange { distance_m: f64 },
    /// Venue ID not present in the catalog
    UnknownVenue,
    /// Remote store insert failed
    StoreUnavailable,
}

impl ReportRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportRejection::LocationUnavailable => "location_unavailable",
            ReportRejection::OutOfRange { .. } => "out_of_range",
            ReportRejection::UnknownVenue => "unknown_venue",
            ReportRejection::StoreUnavailable => "store_unavailable",
        }
    }
}

impl std::fmt::Display for ReportRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportRejection::OutOfRange { distance_m } => {
                write!(f, "out_of_range ({:.0} m)", distance_m)
            }
            other => f.write_str(other.as_str()),
        }
    }
}
