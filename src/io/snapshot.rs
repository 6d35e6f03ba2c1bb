//! Local tally snapshot - persists per-venue counts between runs
//!
//! Local aggregation mode only. The snapshot is a single JSON object
//! mapping venue id to tally, read once at startup and rewritten after
//! every accepted local report.

use crate::domain::types::{CrowdTally, VenueId};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Snapshot file reader/writer
pub struct TallySnapshot {
    file_path: String,
}

impl TallySnapshot {
    pub fn new(file_path: &str) -> Self {
        info!(file_path = %file_path, "snapshot_initialized");
        Self { file_path: file_path.to_string() }
    }

    /// Read the snapshot; a missing or unreadable file yields an empty map
    ///
    /// Corrupt content is logged and discarded rather than failing startup -
    /// seed tallies take over, same as a first run.
    pub fn load(&self) -> HashMap<VenueId, CrowdTally> {
        let path = Path::new(&self.file_path);
        if !path.exists() {
            debug!(file = %self.file_path, "snapshot_missing");
            return HashMap::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %self.file_path, error = %e, "snapshot_read_failed");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<HashMap<VenueId, CrowdTally>>(&content) {
            Ok(tallies) => {
                info!(file = %self.file_path, venues = %tallies.len(), "snapshot_loaded");
                tallies
            }
            Err(e) => {
                warn!(file = %self.file_path, error = %e, "snapshot_corrupt");
                HashMap::new()
            }
        }
    }

    /// Write the full snapshot, replacing any previous content
    ///
    /// Returns true on success. Failure is not fatal: the in-memory
    /// tallies stay authoritative until the next successful write.
    pub fn store(&self, tallies: &HashMap<VenueId, CrowdTally>) -> bool {
        match self.write_file(tallies) {
            Ok(()) => {
                debug!(file = %self.file_path, venues = %tallies.len(), "snapshot_written");
                true
            }
            Err(e) => {
                error!(file = %self.file_path, error = %e, "snapshot_write_failed");
                false
            }
        }
    }

    fn write_file(&self, tallies: &HashMap<VenueId, CrowdTally>) -> anyhow::Result<()> {
        let path = Path::new(&self.file_path);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(tallies)?;
        fs::write(path, json)?;
        Ok(())
    }
}
