//! Geodesic buffers around reference centers

use std::f64::consts::PI;

use geo::{Coord, LineString, Point, Polygon};
use geobands_core::error::{GeobandsError, Result};
use geobands_core::models::{DistanceUnit, ReferenceCenter};

use crate::transform::Reprojector;
use crate::validation::validate_ring;

/// A buffer polygon for one (center, radius) pair
#[derive(Debug, Clone, PartialEq)]
pub struct BufferZone {
    pub center: String,
    pub radius: f64,
    pub unit: DistanceUnit,
    /// Output column for this zone, e.g. `within_1mile_property_center`
    pub column: String,
    /// Polygon in the angular frame
    pub polygon: Polygon<f64>,
}

impl BufferZone {
    /// Build the buffer for `radius` around `center`
    pub fn build(
        center: &ReferenceCenter,
        radius: f64,
        unit: DistanceUnit,
        reprojector: &Reprojector,
        segments_per_quadrant: usize,
    ) -> Result<Self> {
        let polygon = make_buffer(center, radius, unit, reprojector, segments_per_quadrant)?;

        Ok(Self {
            center: center.name().to_string(),
            radius,
            unit,
            column: zone_column(radius, unit, center.name()),
            polygon,
        })
    }
}

/// Column name for a zone flag: `within_{radius}{unit}_{center}`
pub fn zone_column(radius: f64, unit: DistanceUnit, center: &str) -> String {
    format!("within_{}{}_{}", radius, unit.label(), center)
}

/// Widening applied on top of the circumscribed radius so points at exactly
/// `radius` stay inside after unprojection round-off
const RING_SLACK: f64 = 1e-7;

/// Build a polygon approximating every point within `radius` of `center`.
///
/// The circle is drawn in the planar frame with `4 * segments_per_quadrant`
/// vertices, then unprojected vertex-wise. The ring circumscribes the true
/// circle: every point at distance `<= radius` is contained, and the polygon
/// reaches at most `1 / cos(PI / segments) - 1` of the radius beyond it.
pub fn make_buffer(
    center: &ReferenceCenter,
    radius: f64,
    unit: DistanceUnit,
    reprojector: &Reprojector,
    segments_per_quadrant: usize,
) -> Result<Polygon<f64>> {
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(GeobandsError::NonPositiveRadius { radius });
    }

    let (lon, lat) = center.lon_lat();
    let planar_center = reprojector.to_planar(Point::new(lon, lat))?;
    let segments = segments_per_quadrant * 4;
    let vertex_radius = circumscribed_radius(unit.to_meters(radius), segments);
    let ring = circle_ring(planar_center.0, vertex_radius, segments);

    let polygon = Polygon::new(reprojector.ring_to_angular(&ring)?, vec![]);
    validate_ring(&zone_column(radius, unit, center.name()), &polygon)?;

    Ok(polygon)
}

/// Vertex radius of a regular `segments`-gon whose edges touch a circle of `radius`
pub fn circumscribed_radius(radius: f64, segments: usize) -> f64 {
    radius / (PI / segments as f64).cos() * (1.0 + RING_SLACK)
}

/// Closed ring of `segments` vertices on a circle, counter-clockwise from due east
pub fn circle_ring(center: Coord<f64>, radius: f64, segments: usize) -> LineString<f64> {
    let step = 2.0 * PI / segments as f64;
    let mut coords: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let angle = step * i as f64;
            Coord { x: center.x + radius * angle.cos(), y: center.y + radius * angle.sin() }
        })
        .collect();

    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }

    LineString::from(coords)
}
