//! Zone containment.
//!
//! Containment is boundary-inclusive: a point lying exactly on an edge or a
//! vertex of a zone counts as inside. The same rule applies to the boundary
//! polygon and to every buffer zone.

use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Point, Polygon};

/// Whether `point` lies inside or on the boundary of `polygon`
pub fn contains(polygon: &Polygon<f64>, point: &Point<f64>) -> bool {
    matches!(polygon.coordinate_position(&point.0), CoordPos::Inside | CoordPos::OnBoundary)
}

/// Test one point against every named zone.
///
/// Each zone is tested independently, so overlapping zones may all report
/// `true`. Results keep the order of `zones`, duplicates included.
pub fn classify<'a, I>(point: &Point<f64>, zones: I) -> Vec<(&'a str, bool)>
where
    I: IntoIterator<Item = (&'a str, &'a Polygon<f64>)>,
{
    zones.into_iter().map(|(name, polygon)| (name, contains(polygon, point))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 1.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 0.0),
        ]
    }

    #[test]
    fn test_inside_and_outside() {
        let square = unit_square();
        assert!(contains(&square, &Point::new(0.5, 0.5)));
        assert!(!contains(&square, &Point::new(1.5, 0.5)));
        assert!(!contains(&square, &Point::new(0.5, -0.000001)));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let square = unit_square();
        // edge midpoints
        assert!(contains(&square, &Point::new(0.5, 0.0)));
        assert!(contains(&square, &Point::new(1.0, 0.25)));
        // vertex
        assert!(contains(&square, &Point::new(0.0, 0.0)));
        assert!(contains(&square, &Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_classify_keeps_order_and_duplicates() {
        let small = unit_square();
        let large = polygon![
            (x: -1.0, y: -1.0),
            (x: -1.0, y: 2.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: -1.0),
        ];

        let zones = vec![("small", &small), ("large", &large), ("small", &small)];
        let result = classify(&Point::new(1.5, 1.5), zones);

        assert_eq!(result, vec![("small", false), ("large", true), ("small", false)]);
    }

    #[test]
    fn test_classify_no_zones() {
        let result = classify(&Point::new(0.0, 0.0), Vec::<(&str, &Polygon<f64>)>::new());
        assert!(result.is_empty());
    }
}
