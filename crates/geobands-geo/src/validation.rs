//! Coordinate and ring validation

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Coord, Line, Polygon};
use geobands_core::error::{GeobandsError, Result};

/// Check that a `(lon, lat)` pair is finite and within the angular range
pub fn check_angular(lon: f64, lat: f64) -> Result<()> {
    let invalid = |reason: &str| GeobandsError::InvalidCoordinate {
        context: format!("({}, {})", lon, lat),
        reason: reason.to_string(),
    };

    if !lon.is_finite() || !lat.is_finite() {
        return Err(invalid("Coordinates must be finite"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(invalid("Longitude must be within [-180, 180]"));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(invalid("Latitude must be within [-90, 90]"));
    }

    Ok(())
}

/// Validate that a polygon is a single simple closed ring.
///
/// Rejects holes, rings with fewer than four points, unclosed rings,
/// non-finite coordinates, zero area, and self-intersections.
pub fn validate_ring(name: &str, polygon: &Polygon<f64>) -> Result<()> {
    let malformed = |reason: String| GeobandsError::MalformedGeometry {
        name: name.to_string(),
        reason,
    };

    if !polygon.interiors().is_empty() {
        return Err(malformed(format!(
            "Polygon must be a single ring, found {} interior ring(s)",
            polygon.interiors().len()
        )));
    }

    let exterior = polygon.exterior();
    if exterior.0.len() < 4 {
        return Err(malformed(format!(
            "Polygon exterior must have at least 4 points, found {}",
            exterior.0.len()
        )));
    }

    if let (Some(first), Some(last)) = (exterior.0.first(), exterior.0.last()) {
        if first != last {
            return Err(malformed(
                "Polygon exterior must be closed (first point == last point)".to_string(),
            ));
        }
    }

    if let Some((i, _)) =
        exterior.0.iter().enumerate().find(|(_, c)| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(malformed(format!("Polygon exterior[{}]: Coordinates must be finite", i)));
    }

    if let Some((a, b)) = find_self_intersection(&exterior.0) {
        return Err(malformed(format!("Ring self-intersects between segments {} and {}", a, b)));
    }

    if polygon.unsigned_area() <= 0.0 {
        return Err(malformed("Polygon has zero area".to_string()));
    }

    Ok(())
}

/// Return the indices of the first pair of ring segments that cross or overlap
fn find_self_intersection(coords: &[Coord<f64>]) -> Option<(usize, usize)> {
    let mut points = coords.to_vec();
    points.dedup();

    let segments: Vec<Line<f64>> = points.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = segments.len();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                // neighbours always share their joint vertex
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return Some((i, j)),
            }
        }
    }

    None
}
