use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output for classify command
#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub input: String,
    pub output: String,
    pub classified: usize,
    /// Rows dropped by the loader for missing or non-numeric coordinates
    pub dropped: usize,
    /// Observations the engine rejected as invalid coordinates
    pub excluded: Vec<ExcludedInfo>,
    pub boundary_column: String,
    pub within_boundary: usize,
    pub zones: Vec<ZoneCount>,
    pub unit: String,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ExcludedInfo {
    pub id: i64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ZoneCount {
    pub column: String,
    pub count: usize,
}

/// Output for zones command
#[derive(Debug, Serialize)]
pub struct ZonesOutput {
    pub output: String,
    pub zone_count: usize,
    pub map: Option<MapOutput>,
}

#[derive(Debug, Serialize)]
pub struct MapOutput {
    pub output: String,
    pub center: String,
    pub max_distance: f64,
    pub unit: String,
    pub mapped: usize,
    pub classified: usize,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub path: String,
    pub file_found: bool,
    pub values: Vec<ConfigEntry>,
    /// Validation error of the resolved configuration, if any
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}
