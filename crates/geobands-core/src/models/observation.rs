//! Observation records and the reference centers they are measured against.

use serde::{Deserialize, Serialize};

/// A geotagged observation.
///
/// `attributes` holds the full source record as ordered `(column, value)`
/// pairs. The classification engine never reads or rewrites them; they are
/// carried through so writers can reproduce the original columns in their
/// original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub attributes: Vec<(String, String)>,
}

impl Observation {
    /// Create an observation whose record consists of `id`, `longitude` and `latitude`
    pub fn new(id: i64, longitude: f64, latitude: f64) -> Self {
        Self {
            id,
            longitude,
            latitude,
            attributes: vec![
                ("id".to_string(), id.to_string()),
                ("longitude".to_string(), longitude.to_string()),
                ("latitude".to_string(), latitude.to_string()),
            ],
        }
    }

    /// Create an observation from an already-parsed source record
    pub fn from_record(
        id: i64,
        longitude: f64,
        latitude: f64,
        attributes: Vec<(String, String)>,
    ) -> Self {
        Self { id, longitude, latitude, attributes }
    }

    /// Append an attribute to the record
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Look up an attribute value by column name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// A named point of interest used as the origin for buffers and distances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCenter {
    name: String,
    longitude: f64,
    latitude: f64,
}

impl ReferenceCenter {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self { name: name.into(), longitude, latitude }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// `(longitude, latitude)` in degrees
    pub fn lon_lat(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}
