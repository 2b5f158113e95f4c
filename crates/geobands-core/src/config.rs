use crate::error::{GeobandsError, Result};
use crate::models::coordinate::{parse_coordinate, Axis};
use crate::models::geometry::{Bounds, Crs, DistanceUnit, PlanarFrame};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::Path;

/// Default planar frame: WGS 84 / UTM zone 17N
pub const DEFAULT_PLANAR_CRS: u32 = 32617;

/// Fewest circle segments per quadrant that keep the inscribed-chord error
/// of a buffer below 0.1% of its radius
pub const MIN_SEGMENTS_PER_QUADRANT: usize = 18;

pub const DEFAULT_SEGMENTS_PER_QUADRANT: usize = 32;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Angular coordinate as written in a config file: decimal degrees or a DMS string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Decimal(f64),
    Text(String),
}

impl CoordinateValue {
    pub fn to_degrees(&self, axis: Axis) -> Result<f64> {
        match self {
            CoordinateValue::Decimal(value) => Ok(*value),
            CoordinateValue::Text(text) => parse_coordinate(text, axis),
        }
    }
}

/// A reference center as configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterConfig {
    pub name: String,
    #[serde(default)]
    pub lon: Option<CoordinateValue>,
    #[serde(default)]
    pub lat: Option<CoordinateValue>,
    /// Use the centroid of the boundary polygon instead of `lon`/`lat`
    #[serde(default)]
    pub boundary_centroid: bool,
}

/// Where a center's coordinates come from once the config is resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CenterLocation {
    Fixed { lon: f64, lat: f64 },
    BoundaryCentroid,
}

impl CenterConfig {
    /// Center at fixed decimal-degree coordinates
    pub fn fixed(name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            name: name.into(),
            lon: Some(CoordinateValue::Decimal(lon)),
            lat: Some(CoordinateValue::Decimal(lat)),
            boundary_centroid: false,
        }
    }

    /// Center at the centroid of the boundary polygon
    pub fn boundary_centroid(name: impl Into<String>) -> Self {
        Self { name: name.into(), lon: None, lat: None, boundary_centroid: true }
    }

    pub fn location(&self) -> Result<CenterLocation> {
        let key = format!("centers.{}", self.name);
        match (self.boundary_centroid, &self.lon, &self.lat) {
            (true, None, None) => Ok(CenterLocation::BoundaryCentroid),
            (true, _, _) => Err(GeobandsError::ConfigInvalid {
                key,
                reason: "boundary_centroid cannot be combined with lon/lat".to_string(),
            }),
            (false, Some(lon), Some(lat)) => Ok(CenterLocation::Fixed {
                lon: lon.to_degrees(Axis::Longitude)?,
                lat: lat.to_degrees(Axis::Latitude)?,
            }),
            (false, _, _) => Err(GeobandsError::ConfigInvalid {
                key,
                reason: "either lon and lat or boundary_centroid = true is required".to_string(),
            }),
        }
    }
}

/// Column names used to read observations from tabular input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputColumns {
    pub id_column: String,
    pub longitude_column: String,
    pub latitude_column: String,
}

impl Default for InputColumns {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            longitude_column: "longitude".to_string(),
            latitude_column: "latitude".to_string(),
        }
    }
}

/// Fully resolved settings for one classification run.
///
/// Built from a [`LayeredConfig`] or directly through [`ClassificationConfig::new`],
/// which fills every optional setting with its documented default.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationConfig {
    /// Suffix of the boundary flag column (`within_{boundary_name}`)
    pub boundary_name: String,
    pub boundary_wkt: String,
    pub angular_crs: Crs,
    pub planar_frame: PlanarFrame,
    pub distance_unit: DistanceUnit,
    /// Buffer radii in `distance_unit`, in output order. Duplicates are kept.
    pub radii: Vec<f64>,
    pub centers: Vec<CenterConfig>,
    /// Distance cutoff for the map export only; classification ignores it
    pub max_map_distance: f64,
    pub segments_per_quadrant: usize,
    pub input: InputColumns,
}

impl ClassificationConfig {
    pub fn new(boundary_wkt: impl Into<String>, centers: Vec<CenterConfig>) -> Self {
        Self {
            boundary_name: "boundary".to_string(),
            boundary_wkt: boundary_wkt.into(),
            angular_crs: Crs::wgs84(),
            planar_frame: PlanarFrame::for_epsg(DEFAULT_PLANAR_CRS, 3.0),
            distance_unit: DistanceUnit::Miles,
            radii: vec![1.0, 3.0, 5.0],
            centers,
            max_map_distance: 10.0,
            segments_per_quadrant: DEFAULT_SEGMENTS_PER_QUADRANT,
            input: InputColumns::default(),
        }
    }

    pub fn with_planar_frame(mut self, frame: PlanarFrame) -> Self {
        self.planar_frame = frame;
        self
    }

    pub fn with_radii(mut self, radii: Vec<f64>) -> Self {
        self.radii = radii;
        self
    }

    pub fn with_boundary_name(mut self, name: impl Into<String>) -> Self {
        self.boundary_name = name.into();
        self
    }

    /// Check the settings that can be rejected without touching geometry
    pub fn validate(&self) -> Result<()> {
        if self.boundary_wkt.trim().is_empty() {
            return Err(GeobandsError::ConfigMissing { key: "boundary_wkt".to_string() });
        }

        if self.centers.is_empty() {
            return Err(GeobandsError::ConfigMissing { key: "centers".to_string() });
        }

        let mut seen = HashSet::new();
        for center in &self.centers {
            if center.name.trim().is_empty() {
                return Err(GeobandsError::ConfigInvalid {
                    key: "centers".to_string(),
                    reason: "center name must not be empty".to_string(),
                });
            }
            if !seen.insert(center.name.as_str()) {
                return Err(GeobandsError::ConfigInvalid {
                    key: "centers".to_string(),
                    reason: format!("duplicate center name '{}'", center.name),
                });
            }
            center.location()?;
        }

        if self.radii.is_empty() {
            return Err(GeobandsError::ConfigInvalid {
                key: "radii".to_string(),
                reason: "at least one buffer radius is required".to_string(),
            });
        }

        // NaN fails this comparison too
        if let Some(radius) = self.radii.iter().find(|r| !(**r > 0.0 && r.is_finite())) {
            return Err(GeobandsError::NonPositiveRadius { radius: *radius });
        }

        if self.segments_per_quadrant < MIN_SEGMENTS_PER_QUADRANT {
            return Err(GeobandsError::ConfigInvalid {
                key: "segments_per_quadrant".to_string(),
                reason: format!(
                    "must be at least {}, got {}",
                    MIN_SEGMENTS_PER_QUADRANT, self.segments_per_quadrant
                ),
            });
        }

        if !(self.max_map_distance > 0.0) {
            return Err(GeobandsError::ConfigInvalid {
                key: "max_map_distance".to_string(),
                reason: format!("must be positive, got {}", self.max_map_distance),
            });
        }

        if self.angular_crs.epsg == self.planar_frame.crs.epsg {
            return Err(GeobandsError::ConfigInvalid {
                key: "planar_crs".to_string(),
                reason: "planar frame must differ from the angular frame".to_string(),
            });
        }

        Ok(())
    }
}

/// Layered configuration for geobands
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub boundary_name: ConfigValue<String>,
    pub boundary_wkt: ConfigValue<Option<String>>,
    pub angular_crs: ConfigValue<u32>,
    pub planar_crs: ConfigValue<u32>,
    pub domain: ConfigValue<Option<[f64; 4]>>,
    pub domain_margin_degrees: ConfigValue<f64>,
    pub distance_unit: ConfigValue<DistanceUnit>,
    pub radii: ConfigValue<Vec<f64>>,
    pub centers: ConfigValue<Vec<CenterConfig>>,
    pub max_map_distance: ConfigValue<f64>,
    pub segments_per_quadrant: ConfigValue<usize>,
    pub input: ConfigValue<InputColumns>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            boundary_name: ConfigValue::new("boundary".to_string(), ConfigSource::Default),
            boundary_wkt: ConfigValue::new(None, ConfigSource::Default),
            angular_crs: ConfigValue::new(4326, ConfigSource::Default),
            planar_crs: ConfigValue::new(DEFAULT_PLANAR_CRS, ConfigSource::Default),
            domain: ConfigValue::new(None, ConfigSource::Default),
            domain_margin_degrees: ConfigValue::new(3.0, ConfigSource::Default),
            distance_unit: ConfigValue::new(DistanceUnit::Miles, ConfigSource::Default),
            radii: ConfigValue::new(vec![1.0, 3.0, 5.0], ConfigSource::Default),
            centers: ConfigValue::new(Vec::new(), ConfigSource::Default),
            max_map_distance: ConfigValue::new(10.0, ConfigSource::Default),
            segments_per_quadrant: ConfigValue::new(
                DEFAULT_SEGMENTS_PER_QUADRANT,
                ConfigSource::Default,
            ),
            input: ConfigValue::new(InputColumns::default(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeobandsError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file {}: {}", path.as_ref().display(), e),
            })?;

        self.load_from_toml(&content)
    }

    /// Load configuration from TOML text
    pub fn load_from_toml(mut self, content: &str) -> Result<Self> {
        let file_config: FileConfig =
            toml::from_str(content).map_err(|e| GeobandsError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let source = ConfigSource::File;
        if let Some(name) = file_config.boundary_name {
            self.boundary_name.update(name, source);
        }
        if let Some(wkt) = file_config.boundary_wkt {
            self.boundary_wkt.update(Some(wkt), source);
        }
        if let Some(crs) = file_config.angular_crs {
            self.angular_crs.update(crs, source);
        }
        if let Some(crs) = file_config.planar_crs {
            self.planar_crs.update(crs, source);
        }
        if let Some(domain) = file_config.domain {
            self.domain.update(Some(domain), source);
        }
        if let Some(margin) = file_config.domain_margin_degrees {
            self.domain_margin_degrees.update(margin, source);
        }
        if let Some(unit) = file_config.distance_unit {
            self.distance_unit.update(unit, source);
        }
        if let Some(radii) = file_config.radii {
            self.radii.update(radii, source);
        }
        if let Some(centers) = file_config.centers {
            self.centers.update(centers, source);
        }
        if let Some(max) = file_config.max_map_distance {
            self.max_map_distance.update(max, source);
        }
        if let Some(segments) = file_config.segments_per_quadrant {
            self.segments_per_quadrant.update(segments, source);
        }
        if let Some(input) = file_config.input {
            self.input.update(input, source);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOBANDS_PLANAR_CRS
        if let Ok(crs_str) = env::var("GEOBANDS_PLANAR_CRS") {
            match crs_str.trim().parse::<u32>() {
                Ok(crs) => self.planar_crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOBANDS_PLANAR_CRS value '{}': expected integer EPSG code",
                    crs_str
                ),
            }
        }

        // GEOBANDS_DISTANCE_UNIT
        if let Ok(unit_str) = env::var("GEOBANDS_DISTANCE_UNIT") {
            match parse_distance_unit(&unit_str) {
                Ok(unit) => self.distance_unit.update(unit, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOBANDS_DISTANCE_UNIT value '{}': expected meters, kilometers, \
                     miles, or feet",
                    unit_str
                ),
            }
        }

        // GEOBANDS_RADII
        if let Ok(radii_str) = env::var("GEOBANDS_RADII") {
            match parse_radii(&radii_str) {
                Ok(radii) => self.radii.update(radii, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOBANDS_RADII value '{}': expected comma-separated numbers",
                    radii_str
                ),
            }
        }

        // GEOBANDS_MAX_MAP_DISTANCE
        if let Ok(max_str) = env::var("GEOBANDS_MAX_MAP_DISTANCE") {
            match max_str.trim().parse::<f64>() {
                Ok(max) => self.max_map_distance.update(max, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOBANDS_MAX_MAP_DISTANCE value '{}': expected a number",
                    max_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(crs) = overrides.planar_crs {
            self.planar_crs.update(crs, ConfigSource::Cli);
        }

        if let Some(distance_unit) = overrides.distance_unit {
            self.distance_unit.update(distance_unit, ConfigSource::Cli);
        }

        if let Some(radii) = overrides.radii {
            self.radii.update(radii, ConfigSource::Cli);
        }

        if let Some(max) = overrides.max_map_distance {
            self.max_map_distance.update(max, ConfigSource::Cli);
        }
    }

    /// Produce the settings for a classification run, rejecting invalid values
    pub fn resolve(&self) -> Result<ClassificationConfig> {
        let boundary_wkt = self
            .boundary_wkt
            .value
            .clone()
            .ok_or_else(|| GeobandsError::ConfigMissing { key: "boundary_wkt".to_string() })?;

        let mut planar_frame =
            PlanarFrame::for_epsg(self.planar_crs.value, self.domain_margin_degrees.value);
        if let Some(domain) = self.domain.value {
            planar_frame = planar_frame.with_domain(Bounds::from_array(domain));
        }

        let config = ClassificationConfig {
            boundary_name: self.boundary_name.value.clone(),
            boundary_wkt,
            angular_crs: Crs::from_epsg(self.angular_crs.value),
            planar_frame,
            distance_unit: self.distance_unit.value,
            radii: self.radii.value.clone(),
            centers: self.centers.value.clone(),
            max_map_distance: self.max_map_distance.value,
            segments_per_quadrant: self.segments_per_quadrant.value,
            input: self.input.value.clone(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "boundary_name".to_string(),
            (self.boundary_name.value.clone(), self.boundary_name.source),
        );

        map.insert(
            "boundary_wkt".to_string(),
            (
                match &self.boundary_wkt.value {
                    Some(wkt) => summarize_wkt(wkt),
                    None => "(not set)".to_string(),
                },
                self.boundary_wkt.source,
            ),
        );

        map.insert(
            "angular_crs".to_string(),
            (format!("EPSG:{}", self.angular_crs.value), self.angular_crs.source),
        );

        map.insert(
            "planar_crs".to_string(),
            (format!("EPSG:{}", self.planar_crs.value), self.planar_crs.source),
        );

        map.insert(
            "domain".to_string(),
            (
                match self.domain.value {
                    Some(d) => format!("[{}, {}, {}, {}]", d[0], d[1], d[2], d[3]),
                    None => "(derived)".to_string(),
                },
                self.domain.source,
            ),
        );

        map.insert(
            "domain_margin_degrees".to_string(),
            (self.domain_margin_degrees.value.to_string(), self.domain_margin_degrees.source),
        );

        map.insert(
            "distance_unit".to_string(),
            (format!("{:?}", self.distance_unit.value), self.distance_unit.source),
        );

        map.insert(
            "radii".to_string(),
            (
                self.radii.value.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", "),
                self.radii.source,
            ),
        );

        map.insert(
            "centers".to_string(),
            (
                self.centers
                    .value
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.centers.source,
            ),
        );

        map.insert(
            "max_map_distance".to_string(),
            (self.max_map_distance.value.to_string(), self.max_map_distance.source),
        );

        map.insert(
            "segments_per_quadrant".to_string(),
            (self.segments_per_quadrant.value.to_string(), self.segments_per_quadrant.source),
        );

        map
    }
}

fn summarize_wkt(wkt: &str) -> String {
    const LIMIT: usize = 48;
    let trimmed = wkt.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    boundary_name: Option<String>,
    boundary_wkt: Option<String>,
    angular_crs: Option<u32>,
    planar_crs: Option<u32>,
    domain: Option<[f64; 4]>,
    domain_margin_degrees: Option<f64>,
    distance_unit: Option<DistanceUnit>,
    radii: Option<Vec<f64>>,
    centers: Option<Vec<CenterConfig>>,
    max_map_distance: Option<f64>,
    segments_per_quadrant: Option<usize>,
    input: Option<InputColumns>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub planar_crs: Option<u32>,
    pub distance_unit: Option<DistanceUnit>,
    pub radii: Option<Vec<f64>>,
    pub max_map_distance: Option<f64>,
}

/// Parse distance unit from string
pub fn parse_distance_unit(s: &str) -> Result<DistanceUnit> {
    match s.trim().to_lowercase().as_str() {
        "meters" | "m" => Ok(DistanceUnit::Meters),
        "kilometers" | "km" => Ok(DistanceUnit::Kilometers),
        "miles" | "mi" => Ok(DistanceUnit::Miles),
        "feet" | "ft" => Ok(DistanceUnit::Feet),
        _ => Err(GeobandsError::ConfigInvalid {
            key: "distance_unit".to_string(),
            reason: format!("Invalid distance unit: {}. Use meters, kilometers, miles, or feet", s),
        }),
    }
}

/// Parse a comma-separated list of radii such as `1, 2.5, 5`
pub fn parse_radii(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>().map_err(|_| GeobandsError::ConfigInvalid {
                key: "radii".to_string(),
                reason: format!("'{}' is not a number", part),
            })
        })
        .collect()
}
