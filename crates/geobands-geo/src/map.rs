//! Map preparation
//!
//! Filters classified records down to the ones worth drawing around a center,
//! assigns each a display category, and exports zones and records as GeoJSON.

use geo::Polygon;
use geobands_core::error::{GeobandsError, Result};
use geobands_core::models::{ClassificationReport, ClassifiedObservation, ColumnValue};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::distance::distance_column;
use crate::pipeline::ClassificationPipeline;

/// Display category of a classified record relative to one center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapCategory {
    /// Inside the boundary polygon
    Boundary,
    /// Outside the boundary but inside some band of the center
    Buffer,
    Outside,
}

impl MapCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapCategory::Boundary => "boundary",
            MapCategory::Buffer => "buffer",
            MapCategory::Outside => "outside",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MapCategory::Boundary => "red",
            MapCategory::Buffer => "orange",
            MapCategory::Outside => "blue",
        }
    }

    pub fn marker_radius(&self) -> u32 {
        match self {
            MapCategory::Boundary => 5,
            MapCategory::Buffer => 3,
            MapCategory::Outside => 2,
        }
    }
}

/// Category of a record relative to `center`; the boundary takes priority
pub fn categorize(record: &ClassifiedObservation, center: &str) -> MapCategory {
    if record.result.within_boundary {
        MapCategory::Boundary
    } else if record.result.within_any_band_of(center) {
        MapCategory::Buffer
    } else {
        MapCategory::Outside
    }
}

/// Records no farther than `max_distance` from `center`, in input order.
///
/// Fails with `ConfigInvalid` when `center` was not part of the run.
pub fn within_map_range<'a>(
    report: &'a ClassificationReport,
    center: &str,
    max_distance: f64,
) -> Result<Vec<&'a ClassifiedObservation>> {
    if !report.columns.contains(&distance_column(center, report.unit)) {
        return Err(unknown_center(center));
    }

    Ok(report
        .records
        .iter()
        .filter(|r| r.result.distance_to(center).is_some_and(|d| d <= max_distance))
        .collect())
}

/// The boundary and every buffer zone as polygon features
pub fn zones_feature_collection(pipeline: &ClassificationPipeline) -> FeatureCollection {
    let unit = pipeline.unit();
    let mut features = Vec::with_capacity(1 + pipeline.zones().len());

    let mut properties = Map::new();
    properties.insert("kind".to_string(), JsonValue::from("boundary"));
    properties.insert("name".to_string(), JsonValue::from(pipeline.boundary_name()));
    features.push(polygon_feature(pipeline.boundary(), properties));

    for zone in pipeline.zones() {
        let mut properties = Map::new();
        properties.insert("kind".to_string(), JsonValue::from("buffer"));
        properties.insert("name".to_string(), JsonValue::from(zone.column.clone()));
        properties.insert("center".to_string(), JsonValue::from(zone.center.clone()));
        properties.insert("radius".to_string(), JsonValue::from(zone.radius));
        properties.insert("unit".to_string(), JsonValue::from(unit.plural()));
        features.push(polygon_feature(&zone.polygon, properties));
    }

    FeatureCollection { features, bbox: None, foreign_members: None }
}

/// Map-ready point features for the records within `max_distance` of `center`
pub fn observations_feature_collection(
    report: &ClassificationReport,
    center: &str,
    max_distance: f64,
) -> Result<FeatureCollection> {
    let records = within_map_range(report, center, max_distance)?;

    let features = records
        .into_iter()
        .map(|record| {
            let mut properties = Map::new();
            for (name, value) in &record.observation.attributes {
                properties.insert(name.clone(), JsonValue::from(value.clone()));
            }
            for (name, value) in record.result.columns() {
                let value = match value {
                    ColumnValue::Flag(flag) => JsonValue::from(flag),
                    ColumnValue::Distance(distance) => JsonValue::from(distance),
                };
                properties.insert(name, value);
            }

            let category = categorize(record, center);
            properties.insert("category".to_string(), JsonValue::from(category.as_str()));
            properties.insert("color".to_string(), JsonValue::from(category.color()));
            properties.insert("radius".to_string(), JsonValue::from(category.marker_radius()));

            let position = vec![record.observation.longitude, record.observation.latitude];
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(position))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    Ok(FeatureCollection { features, bbox: None, foreign_members: None })
}

fn polygon_feature(polygon: &Polygon<f64>, properties: Map<String, JsonValue>) -> Feature {
    let ring = polygon.exterior().0.iter().map(|c| vec![c.x, c.y]).collect();

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn unknown_center(center: &str) -> GeobandsError {
    GeobandsError::ConfigInvalid {
        key: "center".to_string(),
        reason: format!("no center named '{}' in this run", center),
    }
}
