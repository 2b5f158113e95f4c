//! Planar distances in physical units

use geo::{Distance, Euclidean, Point};
use geobands_core::error::Result;
use geobands_core::models::{DistanceUnit, ReferenceCenter};

use crate::transform::Reprojector;

/// Euclidean distance between two planar points (meters), expressed in `unit`
pub fn planar_distance(a: Point<f64>, b: Point<f64>, unit: DistanceUnit) -> f64 {
    unit.from_meters(Euclidean.distance(a, b))
}

/// Distance from an angular point to a reference center, measured in the planar frame
pub fn distance(
    point: Point<f64>,
    center: &ReferenceCenter,
    unit: DistanceUnit,
    reprojector: &Reprojector,
) -> Result<f64> {
    let (lon, lat) = center.lon_lat();
    let planar_point = reprojector.to_planar(point)?;
    let planar_center = reprojector.to_planar(Point::new(lon, lat))?;

    Ok(planar_distance(planar_point, planar_center, unit))
}

/// Column name for a center distance: `distance_from_{center}_{unit}`
pub fn distance_column(center: &str, unit: DistanceUnit) -> String {
    format!("distance_from_{}_{}", center, unit.plural())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geobands_core::models::{Crs, PlanarFrame};

    #[test]
    fn test_planar_distance_units() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3000.0, 4000.0);

        assert!((planar_distance(a, b, DistanceUnit::Meters) - 5000.0).abs() < 1e-9);
        assert!((planar_distance(a, b, DistanceUnit::Kilometers) - 5.0).abs() < 1e-12);
        assert!((planar_distance(a, b, DistanceUnit::Miles) - 5000.0 / 1609.34).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let reprojector =
            Reprojector::new(&Crs::wgs84(), &PlanarFrame::for_epsg(32617, 3.0)).unwrap();
        let center = ReferenceCenter::new("c", -80.3, 38.9);

        let d =
            distance(Point::new(-80.3, 38.9), &center, DistanceUnit::Miles, &reprojector).unwrap();
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_of_latitude() {
        // One degree of latitude near 38°N is about 111 km (69 miles)
        let reprojector =
            Reprojector::new(&Crs::wgs84(), &PlanarFrame::for_epsg(32617, 3.0)).unwrap();
        let center = ReferenceCenter::new("c", -81.0, 38.0);

        let d =
            distance(Point::new(-81.0, 39.0), &center, DistanceUnit::Miles, &reprojector).unwrap();
        assert!(d > 68.5 && d < 69.5, "got {} miles", d);
    }

    #[test]
    fn test_distance_column() {
        assert_eq!(
            distance_column("property_center", DistanceUnit::Miles),
            "distance_from_property_center_miles"
        );
    }
}
