//! Error types for geobands

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeobandsError {
    // Geometry errors
    #[error("Malformed geometry '{name}': {reason}")]
    MalformedGeometry { name: String, reason: String },

    #[error("Invalid coordinate for {context}: {reason}")]
    InvalidCoordinate { context: String, reason: String },

    #[error("Buffer radius must be greater than zero, got {radius}")]
    NonPositiveRadius { radius: f64 },

    // CRS errors
    #[error("Failed to create projection from {from} to {to}: {reason}")]
    Projection {
        from: String,
        to: String,
        reason: String,
    },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },
}

impl GeobandsError {
    /// Whether this error only affects a single observation rather than the whole run
    pub fn is_per_observation(&self) -> bool {
        matches!(self, GeobandsError::InvalidCoordinate { .. })
    }
}

pub type Result<T> = std::result::Result<T, GeobandsError>;
