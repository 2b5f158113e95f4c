//! CRS transformation between the angular frame and a planar frame

use geo::{Coord, LineString, Point, Polygon};
use geobands_core::error::{GeobandsError, Result};
use geobands_core::models::{Crs, PlanarFrame};
use proj::Proj;

/// Converts points and polygons between one angular CRS and one planar frame.
///
/// Both directions are built up front so a reprojector can be shared across
/// an entire run. The planar frame's linear unit is assumed to be meters.
/// Inputs outside the planar frame's domain are not rejected here; PROJ
/// returns whatever the projection formulas produce for them.
pub struct Reprojector {
    angular: Crs,
    planar: PlanarFrame,
    forward: Proj,
    inverse: Proj,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("angular", &self.angular)
            .field("planar", &self.planar)
            .finish()
    }
}

impl Reprojector {
    /// Create a reprojector for a matched angular/planar pair
    pub fn new(angular: &Crs, planar: &PlanarFrame) -> Result<Self> {
        let forward = create_proj(angular, &planar.crs)?;
        let inverse = create_proj(&planar.crs, angular)?;

        Ok(Self { angular: angular.clone(), planar: planar.clone(), forward, inverse })
    }

    pub fn planar_frame(&self) -> &PlanarFrame {
        &self.planar
    }

    /// Project an angular `(lon, lat)` point to planar meters
    pub fn to_planar(&self, point: Point<f64>) -> Result<Point<f64>> {
        convert(&self.forward, point.0, &self.angular, &self.planar.crs).map(Point::from)
    }

    /// Unproject a planar point back to `(lon, lat)`
    pub fn to_angular(&self, point: Point<f64>) -> Result<Point<f64>> {
        convert(&self.inverse, point.0, &self.planar.crs, &self.angular).map(Point::from)
    }

    /// Project every vertex of a polygon to the planar frame
    pub fn polygon_to_planar(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
        convert_polygon(&self.forward, polygon, &self.angular, &self.planar.crs)
    }

    /// Unproject every vertex of a polygon to the angular frame
    pub fn polygon_to_angular(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
        convert_polygon(&self.inverse, polygon, &self.planar.crs, &self.angular)
    }

    /// Unproject a planar ring vertex-wise
    pub fn ring_to_angular(&self, ring: &LineString<f64>) -> Result<LineString<f64>> {
        convert_ring(&self.inverse, ring, &self.planar.crs, &self.angular)
    }
}

fn create_proj(from: &Crs, to: &Crs) -> Result<Proj> {
    let from_proj = from.authority();
    let to_proj = to.authority();

    Proj::new_known_crs(&from_proj, &to_proj, None).map_err(|e| GeobandsError::Projection {
        from: from_proj.clone(),
        to: to_proj.clone(),
        reason: e.to_string(),
    })
}

fn convert(proj: &Proj, coord: Coord<f64>, from: &Crs, to: &Crs) -> Result<Coord<f64>> {
    let invalid = |reason: String| GeobandsError::InvalidCoordinate {
        context: format!("({}, {}) in EPSG:{}", coord.x, coord.y, from.epsg),
        reason,
    };

    let (x, y) = proj
        .convert((coord.x, coord.y))
        .map_err(|e| invalid(format!("projection to EPSG:{} failed: {}", to.epsg, e)))?;

    if !x.is_finite() || !y.is_finite() {
        return Err(invalid(format!("projection to EPSG:{} produced a non-finite result", to.epsg)));
    }

    Ok(Coord { x, y })
}

fn convert_ring(
    proj: &Proj,
    ring: &LineString<f64>,
    from: &Crs,
    to: &Crs,
) -> Result<LineString<f64>> {
    let coords: Result<Vec<_>> = ring.0.iter().map(|c| convert(proj, *c, from, to)).collect();
    coords.map(LineString::from)
}

fn convert_polygon(
    proj: &Proj,
    polygon: &Polygon<f64>,
    from: &Crs,
    to: &Crs,
) -> Result<Polygon<f64>> {
    let exterior = convert_ring(proj, polygon.exterior(), from, to)?;
    let interiors: Result<Vec<_>> =
        polygon.interiors().iter().map(|ring| convert_ring(proj, ring, from, to)).collect();

    Ok(Polygon::new(exterior, interiors?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn utm17() -> Reprojector {
        Reprojector::new(&Crs::wgs84(), &PlanarFrame::for_epsg(32617, 3.0)).unwrap()
    }

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        // Zone 17's central meridian is 81°W; the equator is northing 0
        let planar = utm17().to_planar(Point::new(-81.0, 0.0)).unwrap();
        assert!((planar.x() - 500_000.0).abs() < 1e-6);
        assert!(planar.y().abs() < 1e-6);
    }

    #[test]
    fn test_point_round_trip() {
        let reprojector = utm17();
        let original = Point::new(-80.4321, 38.9012);

        let planar = reprojector.to_planar(original).unwrap();
        let back = reprojector.to_angular(planar).unwrap();

        assert!((back.x() - original.x()).abs() < 1e-6);
        assert!((back.y() - original.y()).abs() < 1e-6);
    }

    #[test]
    fn test_polygon_round_trip() {
        let reprojector = utm17();
        let square = polygon![
            (x: -80.5, y: 38.5),
            (x: -80.4, y: 38.5),
            (x: -80.4, y: 38.6),
            (x: -80.5, y: 38.6),
            (x: -80.5, y: 38.5),
        ];

        let planar = reprojector.polygon_to_planar(&square).unwrap();
        assert_eq!(planar.exterior().0.len(), square.exterior().0.len());
        // projected coordinates are meters, far from degree values
        assert!(planar.exterior().0.iter().all(|c| c.x > 100_000.0));

        let back = reprojector.polygon_to_angular(&planar).unwrap();
        for (a, b) in square.exterior().0.iter().zip(back.exterior().0.iter()) {
            assert!((a.x - b.x).abs() < 1e-6);
            assert!((a.y - b.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unknown_crs_is_a_projection_error() {
        let result = Reprojector::new(&Crs::wgs84(), &PlanarFrame::for_epsg(999_999, 3.0));
        assert!(matches!(result, Err(GeobandsError::Projection { .. })));
    }
}
