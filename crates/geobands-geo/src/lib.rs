//! geobands geo - the classification engine
//!
//! This crate handles reprojection between the angular and planar frames,
//! geodesic buffer generation, zone containment, planar distances, and the
//! pipeline that applies them to a whole observation set.

pub mod buffer;
pub mod classify;
pub mod distance;
pub mod map;
pub mod pipeline;
pub mod transform;
pub mod validation;

pub use buffer::{make_buffer, BufferZone};
pub use classify::{classify, contains};
pub use distance::{distance, planar_distance};
pub use map::MapCategory;
pub use pipeline::{classify_observations, ClassificationPipeline, PipelineSettings};
pub use transform::Reprojector;
