//! Integration tests for the geobands binary
//!
//! These tests run the compiled binary against a temporary config and
//! observation file and check the files and JSON it produces.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CONFIG: &str = r#"
boundary_name = "property"
boundary_wkt = "POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))"
planar_crs = 32631
radii = [1.0, 3.0]

[[centers]]
name = "property_center"
boundary_centroid = true

[[centers]]
name = "apiary_center"
lon = 0.6
lat = "0 36 0 N"
"#;

const OBSERVATIONS: &str = "\
id,species,longitude,latitude
1,Apis mellifera,0.5,0.5
2,Bombus impatiens,0.52,0.5
3,Danaus plexippus,0.5,5.0
4,Vanessa cardui,,0.5
5,Papilio glaucus,-80.0,38.0
";

fn geobands(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_geobands"))
        .current_dir(dir)
        .env_remove("GEOBANDS_PLANAR_CRS")
        .env_remove("GEOBANDS_DISTANCE_UNIT")
        .env_remove("GEOBANDS_RADII")
        .env_remove("GEOBANDS_MAX_MAP_DISTANCE")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("geobands.toml"), CONFIG).unwrap();
    fs::write(dir.path().join("observations.csv"), OBSERVATIONS).unwrap();
    dir
}

fn parse_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_classify_writes_csv_and_summary() {
    let dir = workspace();
    let output = geobands(
        dir.path(),
        &["classify", "--input", "observations.csv", "--output", "classified.csv", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let parsed = parse_json(&output);
    let data = parsed.get("data").expect("Should have data field");
    assert_eq!(data["classified"], 3);
    assert_eq!(data["dropped"], 1);
    assert_eq!(data["excluded"].as_array().map(Vec::len), Some(1));
    assert_eq!(data["excluded"][0]["id"], 5);
    assert_eq!(data["boundary_column"], "within_property");
    assert_eq!(data["within_boundary"], 2);

    let classified = fs::read_to_string(dir.path().join("classified.csv")).unwrap();
    let header = classified.lines().next().unwrap();
    assert_eq!(
        header,
        "id,species,longitude,latitude,within_property,\
within_1mile_property_center,within_3mile_property_center,\
within_1mile_apiary_center,within_3mile_apiary_center,\
distance_from_property_center_miles,distance_from_apiary_center_miles"
    );
    assert_eq!(classified.lines().count(), 4);
}

#[test]
fn test_cli_radii_override_config_file() {
    let dir = workspace();
    let output = geobands(
        dir.path(),
        &[
            "classify",
            "--input",
            "observations.csv",
            "--output",
            "classified.json",
            "--format",
            "json",
            "--radii",
            "2",
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let rows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("classified.json")).unwrap())
            .unwrap();
    let first = &rows[0];
    assert_eq!(first["within_2mile_property_center"], true);
    assert!(first.get("within_1mile_property_center").is_none());
}

#[test]
fn test_zones_exports_geojson() {
    let dir = workspace();
    let output = geobands(
        dir.path(),
        &[
            "zones",
            "--output",
            "zones.geojson",
            "--observations",
            "observations.csv",
            "--observations-output",
            "map.geojson",
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let data = parse_json(&output)["data"].clone();
    assert_eq!(data["zone_count"], 4);
    assert_eq!(data["map"]["center"], "property_center");
    assert_eq!(data["map"]["mapped"], 2);

    let zones: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("zones.geojson")).unwrap())
            .unwrap();
    assert_eq!(zones["type"], "FeatureCollection");
    assert_eq!(zones["features"].as_array().map(Vec::len), Some(5));

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("map.geojson")).unwrap()).unwrap();
    assert_eq!(map["features"][0]["properties"]["category"], "boundary");
}

#[test]
fn test_zones_rejects_unknown_center() {
    let dir = workspace();
    fs::write(dir.path().join("empty.csv"), "id,longitude,latitude\n1,,0.5\n").unwrap();

    let output = geobands(
        dir.path(),
        &[
            "zones",
            "--output",
            "zones.geojson",
            "--observations",
            "empty.csv",
            "--center",
            "bogus",
            "--observations-output",
            "map.geojson",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown center 'bogus'"));
    assert!(!dir.path().join("map.geojson").exists());
}

#[test]
fn test_config_reports_sources() {
    let dir = workspace();
    let output = geobands(dir.path(), &["config", "--distance-unit", "km", "--json"]);
    assert!(output.status.success());

    let data = parse_json(&output)["data"].clone();
    assert_eq!(data["file_found"], true);
    assert!(data["error"].is_null());

    let values = data["values"].as_array().unwrap();
    let source_of = |key: &str| {
        values
            .iter()
            .find(|v| v["key"] == key)
            .map(|v| v["source"].as_str().unwrap().to_string())
    };
    assert_eq!(source_of("planar_crs").as_deref(), Some("File"));
    assert_eq!(source_of("distance_unit").as_deref(), Some("Cli"));
    assert_eq!(source_of("segments_per_quadrant").as_deref(), Some("Default"));
}

#[test]
fn test_missing_boundary_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("observations.csv"), OBSERVATIONS).unwrap();

    let output = geobands(
        dir.path(),
        &["classify", "--input", "observations.csv", "--output", "classified.csv"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("boundary_wkt"));
}
