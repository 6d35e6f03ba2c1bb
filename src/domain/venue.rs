//! Venue catalog entries

use crate::domain::types::{CrowdTally, GeoPoint, VenueId};
use serde::{Deserialize, Serialize};

/// Catalog badge shown next to a venue name
///
/// Static editorial metadata from the catalog, unrelated to the live
/// crowd level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VenueTag {
    Quiet,
    Popular,
    Busy,
    New,
}

impl VenueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueTag::Quiet => "QUIET",
            VenueTag::Popular => "POPULAR",
            VenueTag::Busy => "BUSY",
            VenueTag::New => "NEW",
        }
    }
}

/// A venue as listed in the catalog
///
/// Static data only; live crowd state is derived elsewhere and never
/// written back into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub cuisine: String,
    pub rating: f64,
    pub tag: VenueTag,
    pub latitude: f64,
    pub longitude: f64,
    /// Starting counts for the local aggregation mode
    #[serde(default)]
    pub seed_tally: CrowdTally,
}

impl Venue {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_tag_serde_uppercase() {
        assert_eq!(serde_json::to_string(&VenueTag::Popular).unwrap(), "\"POPULAR\"");
        let tag: VenueTag = serde_json::from_str("\"NEW\"").unwrap();
        assert_eq!(tag, VenueTag::New);
    }

    #[test]
    fn test_venue_deserializes_without_seed_tally() {
        let json = r#"{
            "id": "42",
            "name": "Test Cafe",
            "cuisine": "Coffee",
            "rating": 4.2,
            "tag": "QUIET",
            "latitude": 14.02,
            "longitude": 99.98
        }"#;
        let venue: Venue = serde_json::from_str(json).unwrap();
        assert_eq!(venue.id, VenueId::from("42"));
        assert_eq!(venue.seed_tally, CrowdTally::default());
        assert_eq!(venue.position(), GeoPoint::new(14.02, 99.98));
    }
}
