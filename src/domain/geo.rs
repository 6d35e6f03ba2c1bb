//! Great-circle distance, proximity checks and distance formatting

use crate::domain::types::GeoPoint;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Shown when no user fix is available
pub const DISTANCE_PLACEHOLDER: &str = "-- m";

/// Haversine distance between two points in meters
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether `user` is close enough to `venue` to act on it
///
/// Inclusive: a distance exactly equal to the radius passes. Callers must
/// resolve the user fix first; a missing fix is handled upstream by
/// refusing the action, never by assuming proximity.
pub fn is_within_range(user: GeoPoint, venue: GeoPoint, radius_m: f64) -> bool {
    haversine_distance_m(user, venue) <= radius_m
}

/// Render a meter distance as a short human string
///
/// Below 1000 raw meters the value is rounded to whole meters; at or above,
/// to one decimal kilometer. The unit branch tests the raw value, so 999.6
/// renders as "1000 m" rather than crossing into kilometers.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
