pub mod classification;
pub mod coordinate;
pub mod geometry;
pub mod observation;

pub use classification::{
    CenterDistance, ClassificationReport, ClassificationResult, ClassifiedObservation,
    ColumnValue, ExcludedObservation, ZoneMembership,
};
pub use coordinate::{dms_to_decimal, parse_coordinate, Axis};
pub use geometry::{Bounds, Crs, DistanceUnit, PlanarFrame, METERS_PER_MILE};
pub use observation::{Observation, ReferenceCenter};
