use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geobands - classify observations by boundary and distance bands
#[derive(Parser, Debug)]
#[command(name = "geobands")]
#[command(
    about = "Classify geotagged observations against a boundary and distance bands",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = "geobands.toml")]
    pub config: PathBuf,

    /// Planar CRS EPSG code (e.g., 32617 for UTM zone 17N)
    #[arg(long, global = true)]
    pub planar_crs: Option<u32>,

    /// Distance unit for radii and distances (meters, kilometers, miles, feet)
    #[arg(long, global = true)]
    pub distance_unit: Option<String>,

    /// Comma-separated buffer radii (e.g., "1,3,5")
    #[arg(long, global = true)]
    pub radii: Option<String>,

    /// Maximum distance from the map center for map export
    #[arg(long, global = true)]
    pub max_distance: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify observations from a CSV file
    Classify(ClassifyArgs),

    /// Export the boundary and buffer zones as GeoJSON
    Zones(ZonesArgs),

    /// Show resolved configuration and where each value came from
    Config,
}

/// File format for classified output
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableFormat {
    /// Original columns plus classification columns
    Csv,
    /// Array of JSON objects, one per observation
    Json,
}

#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Observation CSV file
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Where to write the classified table
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Format of the classified table
    #[arg(long, value_enum, default_value = "csv")]
    pub format: TableFormat,
}

#[derive(Parser, Debug)]
pub struct ZonesArgs {
    /// Where to write the zones GeoJSON
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Observation CSV file to prepare for mapping
    #[arg(long, requires = "observations_output")]
    pub observations: Option<PathBuf>,

    /// Center the map is drawn around (defaults to the first configured center)
    #[arg(long)]
    pub center: Option<String>,

    /// Where to write the map-ready observations GeoJSON
    #[arg(long, requires = "observations")]
    pub observations_output: Option<PathBuf>,
}
