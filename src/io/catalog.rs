//! Venue catalog loading
//!
//! The catalog is a JSON array of venue records. When the file is missing
//! or unreadable the built-in seed catalog (the venues around the
//! Kamphaeng Saen campus) is used so the service always has something to
//! serve.

use crate::domain::types::{CrowdTally, VenueId};
use crate::domain::venue::{Venue, VenueTag};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Load the catalog from a JSON file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<Venue>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read venue catalog {}", path.display()))?;
    let venues: Vec<Venue> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse venue catalog {}", path.display()))?;
    Ok(venues)
}

/// Load the catalog, falling back to the built-in seed list
pub fn load_or_seed(path: &str) -> Vec<Venue> {
    match load_catalog(path) {
        Ok(venues) => {
            info!(file = %path, venues = %venues.len(), "catalog_loaded");
            venues
        }
        Err(e) => {
            warn!(file = %path, error = %e, "catalog_fallback_to_seed");
            seed_catalog()
        }
    }
}

fn venue(
    id: &str,
    name: &str,
    cuisine: &str,
    rating: f64,
    tag: VenueTag,
    latitude: f64,
    longitude: f64,
    seed_tally: CrowdTally,
) -> Venue {
    Venue {
        id: VenueId::from(id),
        name: name.to_string(),
        cuisine: cuisine.to_string(),
        rating,
        tag,
        latitude,
        longitude,
        seed_tally,
    }
}

/// Built-in venue list with real coordinates near KU Kamphaeng Saen campus
pub fn seed_catalog() -> Vec<Venue> {
    vec![
        venue(
            "1",
            "กินเก่ง",
            "Thai Food",
            4.6,
            VenueTag::Popular,
            14.017344401691004,
            99.9927172382506,
            CrowdTally::new(6, 3, 1),
        ),
        venue(
            "2",
            "เตี๋ยวยำติดปีก",
            "Thai Noodles",
            4.5,
            VenueTag::Popular,
            14.017632020102027,
            99.99040176893497,
            CrowdTally::new(4, 8, 5),
        ),
        venue(
            "3",
            "เต๋วเรือ",
            "Boat Noodles",
            4.4,
            VenueTag::Busy,
            14.019612962264643,
            99.99146330941517,
            CrowdTally::new(2, 5, 9),
        ),
        venue(
            "4",
            "ร้านเด็กเส้น",
            "Thai Noodles",
            4.3,
            VenueTag::Quiet,
            14.019129897681074,
            99.99177723837474,
            CrowdTally::new(10, 4, 2),
        ),
        venue(
            "5",
            "ก๋วยเตี๋ยวเรือถูกปาก",
            "Boat Noodles",
            4.7,
            VenueTag::Popular,
            14.021139507656049,
            99.99178282908903,
            CrowdTally::new(3, 7, 6),
        ),
        venue(
            "6",
            "โช ราเมน",
            "Japanese Ramen",
            4.5,
            VenueTag::New,
            14.022419178653173,
            99.9893362094152,
            CrowdTally::new(5, 6, 4),
        ),
        venue(
            "7",
            "ครัว 9 ไร่",
            "Thai Food",
            4.4,
            VenueTag::Quiet,
            14.021960944522768,
            99.98344601885749,
            CrowdTally::new(12, 3, 1),
        ),
        venue(
            "8",
            "ร้านร่มไทร พี่ติ๊ด",
            "Thai Café",
            4.3,
            VenueTag::Quiet,
            14.025928085995977,
            99.9748996002541,
            CrowdTally::new(8, 4, 2),
        ),
        venue(
            "9",
            "เจ๊มะขิ่น",
            "Thai Food",
            4.5,
            VenueTag::New,
            14.0110154,
            99.9958611,
            CrowdTally::new(5, 3, 1),
        ),
        venue(
            "10",
            "เต้าหู้เย็นเป่าปิง",
            "Dessert",
            4.5,
            VenueTag::New,
            14.0210961,
            99.9919658,
            CrowdTally::new(5, 3, 1),
        ),
    ]
}
