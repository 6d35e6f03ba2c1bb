//! Location provider boundary
//!
//! The device/location source is behind a trait so services can be driven
//! with fixed coordinates in tests and simulation. "Permission denied" and
//! "no fix available" both surface as errors; callers treat either as
//! "no location".

use crate::domain::types::GeoPoint;
use anyhow::{bail, Result};
use async_trait::async_trait;

/// One-shot source of the device's current position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoPoint>;
}

/// Provider that always answers with the same coordinates
///
/// Used by the simulation binary and tests. Construct with
/// [`FixedLocationProvider::unavailable`] to exercise the no-location path.
pub struct FixedLocationProvider {
    position: Option<GeoPoint>,
}

impl FixedLocationProvider {
    pub fn at(position: GeoPoint) -> Self {
        Self { position: Some(position) }
    }

    /// A provider that never produces a fix
    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<GeoPoint> {
        match self.position {
            Some(position) => Ok(position),
            None => bail!("location unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_provider_returns_position() {
        let provider = FixedLocationProvider::at(GeoPoint::new(14.0205, 99.9870));
        let fix = provider.current_position().await.unwrap();
        assert_eq!(fix, GeoPoint::new(14.0205, 99.9870));
    }

    #[tokio::test]
    async fn test_unavailable_provider_errors() {
        let provider = FixedLocationProvider::unavailable();
        assert!(provider.current_position().await.is_err());
    }
}
