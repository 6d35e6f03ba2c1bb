//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use crate::domain::types::GeoPoint;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Where crowd reports live and how levels are derived
///
/// `local`: per-venue counts held in memory, persisted to the snapshot
/// file, decayed on every refresh tick.
/// `shared`: reports fetched from the remote store, time-weighted
/// aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Local,
    Shared,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_file")]
    pub file: String,
}

fn default_catalog_file() -> String {
    "data/venues.json".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { file: default_catalog_file() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_file")]
    pub file: String,
}

fn default_snapshot_file() -> String {
    "state/crowd_reports.json".to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { file: default_snapshot_file() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    /// Seconds between location provider polls
    #[serde(default = "default_location_poll_secs")]
    pub poll_interval_secs: u64,
    /// Minimum movement before a fix change is logged
    #[serde(default = "default_min_move_m")]
    pub min_move_m: f64,
    /// Static deployment position; both must be set, else the service
    /// runs without a fix (reporting fails closed, distances show the
    /// placeholder)
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn default_location_poll_secs() -> u64 {
    30
}

fn default_min_move_m() -> f64 {
    50.0
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_location_poll_secs(),
            min_move_m: default_min_move_m(),
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Users must be within this many meters of a venue to report
    #[serde(default = "default_proximity_radius_m")]
    pub proximity_radius_m: f64,
}

fn default_proximity_radius_m() -> f64 {
    500.0
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self { proximity_radius_m: default_proximity_radius_m() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between crowd data refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub interval_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    900
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: default_refresh_interval_secs() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_mode")]
    pub mode: StoreMode,
    /// Base URL of the remote report collection (shared mode)
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_store_mode() -> StoreMode {
    StoreMode::Local
}

fn default_store_timeout_ms() -> u64 {
    2000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: default_store_mode(),
            base_url: String::new(),
            api_key: None,
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    catalog_file: String,
    snapshot_file: String,
    location_poll_interval_secs: u64,
    location_min_move_m: f64,
    static_position: Option<GeoPoint>,
    proximity_radius_m: f64,
    refresh_interval_secs: u64,
    store_mode: StoreMode,
    store_base_url: String,
    store_api_key: Option<String>,
    store_timeout_ms: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        let static_position = match (toml_config.location.latitude, toml_config.location.longitude)
        {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        };

        Self {
            catalog_file: toml_config.catalog.file,
            snapshot_file: toml_config.snapshot.file,
            location_poll_interval_secs: toml_config.location.poll_interval_secs,
            location_min_move_m: toml_config.location.min_move_m,
            static_position,
            proximity_radius_m: toml_config.reporting.proximity_radius_m,
            refresh_interval_secs: toml_config.refresh.interval_secs,
            store_mode: toml_config.store.mode,
            store_base_url: toml_config.store.base_url,
            store_api_key: toml_config.store.api_key,
            store_timeout_ms: toml_config.store.timeout_ms,
            config_file: config_file.to_string(),
        }
    }

    /// Determine config file path from args or environment
    pub fn resolve_config_path(args: &[String]) -> String {
        for (i, arg) in args.iter().enumerate() {
            if arg == "--config" {
                if let Some(path) = args.get(i + 1) {
                    return path.clone();
                }
            }
            if let Some(path) = arg.strip_prefix("--config=") {
                return path.to_string();
            }
        }

        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        "config/dev.toml".to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration from a path - falls back to defaults on any error
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn catalog_file(&self) -> &str {
        &self.catalog_file
    }

    pub fn snapshot_file(&self) -> &str {
        &self.snapshot_file
    }

    pub fn location_poll_interval_secs(&self) -> u64 {
        self.location_poll_interval_secs
    }

    pub fn location_min_move_m(&self) -> f64 {
        self.location_min_move_m
    }

    /// Configured deployment position, if any
    pub fn static_position(&self) -> Option<GeoPoint> {
        self.static_position
    }

    pub fn proximity_radius_m(&self) -> f64 {
        self.proximity_radius_m
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        self.refresh_interval_secs
    }

    pub fn store_mode(&self) -> StoreMode {
        self.store_mode
    }

    pub fn store_base_url(&self) -> &str {
        &self.store_base_url
    }

    pub fn store_api_key(&self) -> Option<&str> {
        self.store_api_key.as_deref()
    }

    pub fn store_timeout_ms(&self) -> u64 {
        self.store_timeout_ms
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}
