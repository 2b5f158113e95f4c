//! Classification pipeline
//!
//! Builds every buffer zone once, then walks the observations in order and
//! attaches boundary containment, zone containment and center distances to
//! each one.

use geo::{Centroid, Point, Polygon};
use geobands_core::config::{CenterConfig, CenterLocation, ClassificationConfig};
use geobands_core::error::{GeobandsError, Result};
use geobands_core::models::{
    CenterDistance, ClassificationReport, ClassificationResult, ClassifiedObservation,
    DistanceUnit, ExcludedObservation, Observation, ReferenceCenter, ZoneMembership,
};
use tracing::{debug, info, warn};
use wkt::TryFromWkt;

use crate::buffer::BufferZone;
use crate::classify::{classify, contains};
use crate::distance::{distance_column, planar_distance};
use crate::transform::Reprojector;
use crate::validation::{check_angular, validate_ring};

/// Settings that shape the output of a run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Suffix of the boundary flag column (`within_{boundary_name}`)
    pub boundary_name: String,
    pub unit: DistanceUnit,
    pub segments_per_quadrant: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            boundary_name: "boundary".to_string(),
            unit: DistanceUnit::Miles,
            segments_per_quadrant: geobands_core::config::DEFAULT_SEGMENTS_PER_QUADRANT,
        }
    }
}

impl PipelineSettings {
    pub fn boundary_column(&self) -> String {
        format!("within_{}", self.boundary_name)
    }
}

/// A reference center with its planar position precomputed
#[derive(Debug, Clone)]
pub struct ProjectedCenter {
    pub center: ReferenceCenter,
    pub planar: Point<f64>,
    pub distance_column: String,
}

/// Reference geometries for one run, ready to classify observations
#[derive(Debug)]
pub struct ClassificationPipeline {
    reprojector: Reprojector,
    settings: PipelineSettings,
    boundary: Polygon<f64>,
    centers: Vec<ProjectedCenter>,
    /// Grouped by center, radii in configured order
    zones: Vec<BufferZone>,
}

impl ClassificationPipeline {
    /// Build the pipeline: validate the boundary, project the centers and
    /// generate one buffer zone per (center, radius) pair.
    pub fn new(
        boundary: Polygon<f64>,
        centers: Vec<ReferenceCenter>,
        radii: &[f64],
        reprojector: Reprojector,
        settings: PipelineSettings,
    ) -> Result<Self> {
        if let Some(radius) = radii.iter().find(|r| !(**r > 0.0 && r.is_finite())) {
            return Err(GeobandsError::NonPositiveRadius { radius: *radius });
        }

        validate_ring(&settings.boundary_name, &boundary)?;

        let frame = reprojector.planar_frame();
        let mut projected = Vec::with_capacity(centers.len());
        for center in centers {
            let (lon, lat) = center.lon_lat();
            check_angular(lon, lat).map_err(|e| center_error(&center, e))?;
            if !frame.covers(lon, lat) {
                return Err(GeobandsError::InvalidCoordinate {
                    context: format!("center '{}'", center.name()),
                    reason: format!("outside the domain of {}", frame.crs.authority()),
                });
            }

            let planar = reprojector
                .to_planar(Point::new(lon, lat))
                .map_err(|e| center_error(&center, e))?;
            let distance_column = distance_column(center.name(), settings.unit);
            projected.push(ProjectedCenter { center, planar, distance_column });
        }

        let mut zones = Vec::with_capacity(projected.len() * radii.len());
        for projected_center in &projected {
            for &radius in radii {
                let zone = BufferZone::build(
                    &projected_center.center,
                    radius,
                    settings.unit,
                    &reprojector,
                    settings.segments_per_quadrant,
                )?;
                debug!(
                    "Built {} buffer around {} ({} vertices)",
                    zone.column,
                    zone.center,
                    zone.polygon.exterior().0.len()
                );
                zones.push(zone);
            }
        }

        info!(
            "Prepared {} buffer zone(s) around {} center(s) in {}",
            zones.len(),
            projected.len(),
            frame.crs.authority()
        );

        Ok(Self { reprojector, settings, boundary, centers: projected, zones })
    }

    /// Build the pipeline from resolved configuration
    pub fn from_config(config: &ClassificationConfig) -> Result<Self> {
        config.validate()?;

        let boundary = parse_boundary_wkt(&config.boundary_name, &config.boundary_wkt)?;
        let centers = resolve_centers(&config.centers, &boundary)?;
        let reprojector = Reprojector::new(&config.angular_crs, &config.planar_frame)?;
        let settings = PipelineSettings {
            boundary_name: config.boundary_name.clone(),
            unit: config.distance_unit,
            segments_per_quadrant: config.segments_per_quadrant,
        };

        Self::new(boundary, centers, &config.radii, reprojector, settings)
    }

    pub fn boundary(&self) -> &Polygon<f64> {
        &self.boundary
    }

    pub fn boundary_name(&self) -> &str {
        &self.settings.boundary_name
    }

    pub fn centers(&self) -> &[ProjectedCenter] {
        &self.centers
    }

    /// Look up a configured center by name
    pub fn center(&self, name: &str) -> Option<&ProjectedCenter> {
        self.centers.iter().find(|c| c.center.name() == name)
    }

    pub fn zones(&self) -> &[BufferZone] {
        &self.zones
    }

    pub fn unit(&self) -> DistanceUnit {
        self.settings.unit
    }

    pub fn reprojector(&self) -> &Reprojector {
        &self.reprojector
    }

    /// Appended column names in output order
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(1 + self.zones.len() + self.centers.len());
        columns.push(self.settings.boundary_column());
        columns.extend(self.zones.iter().map(|z| z.column.clone()));
        columns.extend(self.centers.iter().map(|c| c.distance_column.clone()));
        columns
    }

    /// Classify a single observation.
    ///
    /// Fails with `InvalidCoordinate` when the observation is outside the
    /// angular range, outside the planar frame's domain, or cannot be projected.
    pub fn classify_observation(&self, observation: &Observation) -> Result<ClassificationResult> {
        let (lon, lat) = (observation.longitude, observation.latitude);
        check_angular(lon, lat)?;

        let frame = self.reprojector.planar_frame();
        if !frame.covers(lon, lat) {
            return Err(GeobandsError::InvalidCoordinate {
                context: format!("({}, {})", lon, lat),
                reason: format!("outside the domain of {}", frame.crs.authority()),
            });
        }

        let point = Point::new(lon, lat);
        let planar = self.reprojector.to_planar(point)?;

        let flags = classify(&point, self.zones.iter().map(|z| (z.column.as_str(), &z.polygon)));
        let zones = self
            .zones
            .iter()
            .zip(flags)
            .map(|(zone, (_, contained))| ZoneMembership {
                column: zone.column.clone(),
                center: zone.center.clone(),
                radius: zone.radius,
                contained,
            })
            .collect();

        let distances = self
            .centers
            .iter()
            .map(|c| CenterDistance {
                column: c.distance_column.clone(),
                center: c.center.name().to_string(),
                distance: planar_distance(planar, c.planar, self.settings.unit),
            })
            .collect();

        Ok(ClassificationResult {
            boundary_column: self.settings.boundary_column(),
            within_boundary: contains(&self.boundary, &point),
            zones,
            distances,
        })
    }

    /// Classify every observation, preserving input order.
    ///
    /// Observations with invalid coordinates are excluded and listed in the
    /// report; any other failure aborts the run.
    pub fn run(&self, observations: &[Observation]) -> Result<ClassificationReport> {
        let mut records = Vec::with_capacity(observations.len());
        let mut excluded = Vec::new();

        for observation in observations {
            match self.classify_observation(observation) {
                Ok(result) => {
                    records.push(ClassifiedObservation { observation: observation.clone(), result })
                }
                Err(e) if e.is_per_observation() => {
                    debug!("Excluding observation {}: {}", observation.id, e);
                    excluded.push(ExcludedObservation {
                        id: observation.id,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if !excluded.is_empty() {
            warn!(
                "Excluded {} of {} observation(s) with invalid coordinates",
                excluded.len(),
                observations.len()
            );
        }

        let report = ClassificationReport {
            columns: self.columns(),
            unit: self.settings.unit,
            records,
            excluded,
        };

        info!(
            "Classified {} observation(s): {} within {}",
            report.len(),
            report.count_within_boundary(),
            self.settings.boundary_name
        );
        for (column, count) in report.zone_counts() {
            debug!("{}: {}", column, count);
        }

        Ok(report)
    }
}

/// Classify observations against freshly built reference geometries
pub fn classify_observations(
    observations: &[Observation],
    boundary: Polygon<f64>,
    centers: Vec<ReferenceCenter>,
    radii: &[f64],
    reprojector: Reprojector,
    settings: PipelineSettings,
) -> Result<ClassificationReport> {
    ClassificationPipeline::new(boundary, centers, radii, reprojector, settings)?.run(observations)
}

/// Parse a boundary polygon from well-known text
pub fn parse_boundary_wkt(name: &str, wkt: &str) -> Result<Polygon<f64>> {
    let polygon =
        Polygon::<f64>::try_from_wkt_str(wkt.trim()).map_err(|e| GeobandsError::MalformedGeometry {
            name: name.to_string(),
            reason: format!("Failed to parse WKT polygon: {}", e),
        })?;

    validate_ring(name, &polygon)?;
    Ok(polygon)
}

/// Turn configured centers into reference centers, computing the boundary
/// centroid where requested
pub fn resolve_centers(
    configs: &[CenterConfig],
    boundary: &Polygon<f64>,
) -> Result<Vec<ReferenceCenter>> {
    configs
        .iter()
        .map(|config| match config.location()? {
            CenterLocation::Fixed { lon, lat } => Ok(ReferenceCenter::new(&config.name, lon, lat)),
            CenterLocation::BoundaryCentroid => {
                let centroid = boundary.centroid().ok_or_else(|| GeobandsError::MalformedGeometry {
                    name: config.name.clone(),
                    reason: "boundary polygon has no centroid".to_string(),
                })?;
                info!(
                    "Center '{}' at boundary centroid ({}, {})",
                    config.name,
                    centroid.x(),
                    centroid.y()
                );
                Ok(ReferenceCenter::new(&config.name, centroid.x(), centroid.y()))
            }
        })
        .collect()
}

fn center_error(center: &ReferenceCenter, error: GeobandsError) -> GeobandsError {
    match error {
        GeobandsError::InvalidCoordinate { reason, .. } => GeobandsError::InvalidCoordinate {
            context: format!("center '{}'", center.name()),
            reason,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geobands_core::models::{Crs, PlanarFrame};

    const SQUARE: &str = "POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))";

    fn reprojector() -> Reprojector {
        Reprojector::new(&Crs::wgs84(), &PlanarFrame::for_epsg(32631, 3.0)).unwrap()
    }

    fn pipeline(radii: &[f64]) -> ClassificationPipeline {
        let boundary = parse_boundary_wkt("boundary", SQUARE).unwrap();
        let centers = vec![
            ReferenceCenter::new("property_center", 0.5, 0.5),
            ReferenceCenter::new("apiary_center", 0.6, 0.6),
        ];
        ClassificationPipeline::new(
            boundary,
            centers,
            radii,
            reprojector(),
            PipelineSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_columns_grouped_by_center() {
        let pipeline = pipeline(&[1.0, 5.0]);
        assert_eq!(
            pipeline.columns(),
            vec![
                "within_boundary",
                "within_1mile_property_center",
                "within_5mile_property_center",
                "within_1mile_apiary_center",
                "within_5mile_apiary_center",
                "distance_from_property_center_miles",
                "distance_from_apiary_center_miles",
            ]
        );
    }

    #[test]
    fn test_center_lookup_by_name() {
        let pipeline = pipeline(&[1.0]);
        let apiary = pipeline.center("apiary_center").unwrap();
        assert_eq!(apiary.distance_column, "distance_from_apiary_center_miles");
        assert!(pipeline.center("bogus").is_none());
    }

    #[test]
    fn test_run_preserves_order() {
        let pipeline = pipeline(&[1.0]);
        let observations: Vec<Observation> =
            (0..5).map(|i| Observation::new(10 - i, 0.1 * i as f64, 0.5)).collect();

        let report = pipeline.run(&observations).unwrap();
        let ids: Vec<i64> = report.records.iter().map(|r| r.observation.id).collect();
        assert_eq!(ids, vec![10, 9, 8, 7, 6]);
    }

    #[test]
    fn test_invalid_coordinates_are_excluded_and_reported() {
        let pipeline = pipeline(&[1.0]);
        let observations = vec![
            Observation::new(1, 0.5, 0.5),
            Observation::new(2, 200.0, 0.5),
            Observation::new(3, 0.5, -95.0),
            // far outside UTM zone 31
            Observation::new(4, -80.0, 38.0),
            Observation::new(5, 0.4, 0.4),
        ];

        let report = pipeline.run(&observations).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.excluded_count(), 3);
        let excluded: Vec<i64> = report.excluded.iter().map(|e| e.id).collect();
        assert_eq!(excluded, vec![2, 3, 4]);
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let boundary = parse_boundary_wkt("boundary", SQUARE).unwrap();
        let result = ClassificationPipeline::new(
            boundary,
            vec![ReferenceCenter::new("c", 0.5, 0.5)],
            &[1.0, -1.0],
            reprojector(),
            PipelineSettings::default(),
        );
        assert!(matches!(
            result,
            Err(GeobandsError::NonPositiveRadius { radius }) if radius == -1.0
        ));
    }

    #[test]
    fn test_center_outside_domain_is_fatal() {
        let boundary = parse_boundary_wkt("boundary", SQUARE).unwrap();
        let result = ClassificationPipeline::new(
            boundary,
            vec![ReferenceCenter::new("far", -80.0, 38.0)],
            &[1.0],
            reprojector(),
            PipelineSettings::default(),
        );
        assert!(matches!(
            result,
            Err(GeobandsError::InvalidCoordinate { context, .. }) if context.contains("far")
        ));
    }

    #[test]
    fn test_parse_boundary_wkt_errors() {
        assert!(matches!(
            parse_boundary_wkt("boundary", "POLYGON((0 0, 1 1"),
            Err(GeobandsError::MalformedGeometry { .. })
        ));
        assert!(matches!(
            parse_boundary_wkt("boundary", "POINT(0 0)"),
            Err(GeobandsError::MalformedGeometry { .. })
        ));
        assert!(matches!(
            parse_boundary_wkt("boundary", "POLYGON((0 0, 1 1, 1 0, 0 1, 0 0))"),
            Err(GeobandsError::MalformedGeometry { .. })
        ));
    }

    #[test]
    fn test_resolve_boundary_centroid() {
        let boundary =
            parse_boundary_wkt("boundary", "POLYGON((0 0, 0 2, 2 2, 2 0, 0 0))").unwrap();
        let configured = [
            CenterConfig::boundary_centroid("property_center"),
            CenterConfig::fixed("apiary", 1.5, 0.5),
        ];
        let centers = resolve_centers(&configured, &boundary).unwrap();

        assert_eq!(centers[0].name(), "property_center");
        assert!((centers[0].longitude() - 1.0).abs() < 1e-12);
        assert!((centers[0].latitude() - 1.0).abs() < 1e-12);
        assert_eq!(centers[1].lon_lat(), (1.5, 0.5));
    }

    #[test]
    fn test_from_config() {
        let config = ClassificationConfig::new(
            SQUARE,
            vec![CenterConfig::boundary_centroid("property_center")],
        )
        .with_planar_frame(PlanarFrame::for_epsg(32631, 3.0))
        .with_radii(vec![1.0, 3.0])
        .with_boundary_name("property");

        let pipeline = ClassificationPipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.zones().len(), 2);
        assert_eq!(pipeline.columns()[0], "within_property");

        let report = pipeline.run(&[Observation::new(1, 0.5, 0.5)]).unwrap();
        assert!(report.records[0].result.within_boundary);
    }
}
