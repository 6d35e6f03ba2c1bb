//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `location` - location provider boundary and fixed test provider
//! - `store` - report store boundary and in-memory implementation
//! - `rest_store` - HTTP/JSON client for the remote report collection
//! - `snapshot` - local tally snapshot file (local aggregation mode)
//! - `catalog` - venue catalog loading with built-in seed fallback

pub mod catalog;
pub mod location;
pub mod rest_store;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use catalog::{load_or_seed, seed_catalog};
pub use location::{FixedLocationProvider, LocationProvider};
pub use rest_store::{RestReportStore, RestStoreConfig};
pub use snapshot::TallySnapshot;
pub use store::{MemoryReportStore, ReportStore};
