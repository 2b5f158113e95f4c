//! Coordinate reference systems, distance units and planar frames.
//!
//! These types describe the frames the classification engine moves between:
//! an angular frame (longitude/latitude degrees) and a locally-accurate planar
//! frame (meters).

use serde::{Deserialize, Serialize};

/// Meters in one international mile, as used for buffer radii and distances
pub const METERS_PER_MILE: f64 = 1609.34;

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// Build a CRS from a bare EPSG code, naming it where the code is well known
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            3857 => Self::new(3857, "Web Mercator"),
            32601..=32660 => Self::new(epsg, format!("WGS 84 / UTM zone {}N", epsg - 32600)),
            32701..=32760 => Self::new(epsg, format!("WGS 84 / UTM zone {}S", epsg - 32700)),
            _ => Self::new(epsg, format!("EPSG:{}", epsg)),
        }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// Authority string understood by PROJ, e.g. `EPSG:32617`
    pub fn authority(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

/// Distance units for buffer radii and reported distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    #[default]
    Miles,
    Feet,
}

impl DistanceUnit {
    /// Convert a distance value to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meters => value,
            DistanceUnit::Kilometers => value * 1000.0,
            DistanceUnit::Miles => value * METERS_PER_MILE,
            DistanceUnit::Feet => value * 0.3048,
        }
    }

    /// Convert a distance value from meters to this unit
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Meters => meters,
            DistanceUnit::Kilometers => meters / 1000.0,
            DistanceUnit::Miles => meters / METERS_PER_MILE,
            DistanceUnit::Feet => meters / 0.3048,
        }
    }

    /// Singular label used in zone column names (`within_1mile_...`)
    pub fn label(&self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mile",
            DistanceUnit::Feet => "ft",
        }
    }

    /// Plural label used in distance column names (`distance_from_..._miles`)
    pub fn plural(&self) -> &'static str {
        match self {
            DistanceUnit::Meters => "meters",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::Miles => "miles",
            DistanceUnit::Feet => "feet",
        }
    }
}

/// Longitude/latitude rectangle, inclusive on all edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    /// Build from `[min_lon, min_lat, max_lon, max_lat]`
    pub fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Clamp to the valid angular range
    fn clamp_to_world(self) -> Self {
        Self::new(
            self.min_lon.max(-180.0),
            self.min_lat.max(-90.0),
            self.max_lon.min(180.0),
            self.max_lat.min(90.0),
        )
    }
}

/// A projected CRS together with the angular region it is valid for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarFrame {
    pub crs: Crs,
    /// Observations outside this region are rejected before projection.
    /// `None` means the frame does not restrict its inputs.
    pub domain: Option<Bounds>,
}

impl PlanarFrame {
    /// Frame for an EPSG code, deriving the domain for WGS 84 / UTM zones
    pub fn for_epsg(epsg: u32, margin_degrees: f64) -> Self {
        Self { crs: Crs::from_epsg(epsg), domain: utm_domain(epsg, margin_degrees) }
    }

    /// Replace the derived domain with an explicit one
    pub fn with_domain(mut self, domain: Bounds) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Whether an angular coordinate lies inside the frame's domain
    pub fn covers(&self, lon: f64, lat: f64) -> bool {
        self.domain.map_or(true, |d| d.contains(lon, lat))
    }
}

/// Longitude band of a UTM zone (6° wide) and latitude band of its hemisphere,
/// widened by `margin` degrees. Returns `None` for non-UTM codes.
pub fn utm_domain(epsg: u32, margin: f64) -> Option<Bounds> {
    let (zone, north) = match epsg {
        32601..=32660 => (epsg - 32600, true),
        32701..=32760 => (epsg - 32700, false),
        _ => return None,
    };

    let min_lon = -180.0 + 6.0 * (zone as f64 - 1.0);
    let max_lon = min_lon + 6.0;
    let (min_lat, max_lat) = if north { (-margin, 84.0) } else { (-80.0, margin) };

    Some(Bounds::new(min_lon - margin, min_lat, max_lon + margin, max_lat).clamp_to_world())
}
