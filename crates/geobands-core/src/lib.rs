//! geobands core - domain models, errors, and configuration
//!
//! This crate holds the types shared by the classification engine and its
//! command-line front end. It has no geometry dependencies of its own.

pub mod config;
pub mod error;
pub mod models;

pub use config::{ClassificationConfig, LayeredConfig};
pub use error::{GeobandsError, Result};
