//! Services - business logic and state management
//!
//! This module contains the core business services:
//! - `location` - cached device fix with poll loop and one-shot refresh
//! - `directory` - venue list, gated report submission, crowd refresh

pub mod directory;
pub mod location;

// Re-export commonly used types
pub use directory::{VenueDirectory, VenueStatus};
pub use location::LocationTracker;
