//! Classification results attached to observations.

use serde::{Deserialize, Serialize};

use super::geometry::DistanceUnit;
use super::observation::Observation;

/// Containment of an observation in one (center, radius) buffer zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMembership {
    pub column: String,
    pub center: String,
    pub radius: f64,
    pub contained: bool,
}

/// Distance from an observation to one reference center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterDistance {
    pub column: String,
    pub center: String,
    pub distance: f64,
}

/// Everything the engine computes for a single observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub boundary_column: String,
    pub within_boundary: bool,
    /// Grouped by center, radii in configured order
    pub zones: Vec<ZoneMembership>,
    /// One entry per center, in configured order
    pub distances: Vec<CenterDistance>,
}

impl ClassificationResult {
    /// Whether the observation falls inside any band of the named center
    pub fn within_any_band_of(&self, center: &str) -> bool {
        self.zones.iter().any(|z| z.center == center && z.contained)
    }

    /// Distance to the named center, if that center was classified
    pub fn distance_to(&self, center: &str) -> Option<f64> {
        self.distances.iter().find(|d| d.center == center).map(|d| d.distance)
    }

    /// Appended columns in output order: boundary flag, zone flags, distances
    pub fn columns(&self) -> Vec<(String, ColumnValue)> {
        let mut columns = Vec::with_capacity(1 + self.zones.len() + self.distances.len());
        columns.push((self.boundary_column.clone(), ColumnValue::Flag(self.within_boundary)));
        for zone in &self.zones {
            columns.push((zone.column.clone(), ColumnValue::Flag(zone.contained)));
        }
        for distance in &self.distances {
            columns.push((distance.column.clone(), ColumnValue::Distance(distance.distance)));
        }
        columns
    }
}

/// Value of an appended classification column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Flag(bool),
    Distance(f64),
}

impl std::fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnValue::Flag(flag) => write!(f, "{}", flag),
            ColumnValue::Distance(distance) => write!(f, "{}", distance),
        }
    }
}

/// An observation together with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedObservation {
    pub observation: Observation,
    pub result: ClassificationResult,
}

/// An observation the engine refused to classify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedObservation {
    pub id: i64,
    pub reason: String,
}

/// Outcome of one classification run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Names of the appended columns, in output order
    pub columns: Vec<String>,
    pub unit: DistanceUnit,
    /// Classified records in input order
    pub records: Vec<ClassifiedObservation>,
    pub excluded: Vec<ExcludedObservation>,
}

impl ClassificationReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    /// Number of records inside the boundary polygon
    pub fn count_within_boundary(&self) -> usize {
        self.records.iter().filter(|r| r.result.within_boundary).count()
    }

    /// Number of records flagged true for each appended zone column, in column order
    pub fn zone_counts(&self) -> Vec<(String, usize)> {
        let Some(first) = self.records.first() else {
            return Vec::new();
        };

        first
            .result
            .zones
            .iter()
            .enumerate()
            .map(|(i, zone)| {
                let count = self.records.iter().filter(|r| r.result.zones[i].contained).count();
                (zone.column.clone(), count)
            })
            .collect()
    }
}
