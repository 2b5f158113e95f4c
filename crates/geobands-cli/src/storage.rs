//! CSV and JSON storage for observation tables

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use geobands_core::config::InputColumns;
use geobands_core::models::{ClassificationReport, ColumnValue, Observation};
use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

/// Observations read from a CSV file
#[derive(Debug)]
pub struct ObservationTable {
    /// Original column names in file order
    pub headers: Vec<String>,
    pub observations: Vec<Observation>,
    /// Rows dropped for missing or non-numeric coordinates
    pub dropped: usize,
}

/// Load observations from a CSV file with a header row.
///
/// Rows whose longitude or latitude is empty or not a number are dropped and
/// counted. A row with an unreadable identifier is an error.
pub fn load_observations(path: &Path, columns: &InputColumns) -> Result<ObservationTable> {
    info!("Loading observations from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("Failed to open observation file {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(false).from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Column '{}' not found in {}", name, path.display()))
    };
    let id_idx = position(&columns.id_column)?;
    let lon_idx = position(&columns.longitude_column)?;
    let lat_idx = position(&columns.latitude_column)?;

    let mut observations = Vec::new();
    let mut dropped = 0;

    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row + 1))?;

        let (Some(lon), Some(lat)) =
            (parse_number(&record[lon_idx]), parse_number(&record[lat_idx]))
        else {
            dropped += 1;
            continue;
        };

        let raw_id = record[id_idx].trim();
        let id: i64 = match raw_id.parse() {
            Ok(id) => id,
            Err(_) => bail!("Row {}: '{}' is not a valid observation id", row + 1, raw_id),
        };

        let attributes = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        observations.push(Observation::from_record(id, lon, lat, attributes));
    }

    if dropped > 0 {
        warn!("Dropped {} row(s) with missing coordinates", dropped);
    }
    info!("Loaded {} observations", observations.len());

    Ok(ObservationTable { headers, observations, dropped })
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Write the classified records as CSV: original columns, then classification columns
pub fn write_csv(path: &Path, headers: &[String], report: &ClassificationReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

    writer.write_record(headers.iter().chain(report.columns.iter()))?;

    for record in &report.records {
        let original = record.observation.attributes.iter().map(|(_, value)| value.clone());
        let appended = record.result.columns().into_iter().map(|(_, value)| value.to_string());
        writer.write_record(original.chain(appended))?;
    }

    writer.flush()?;
    info!("Wrote {} classified rows to {}", report.len(), path.display());
    Ok(())
}

/// Write the classified records as a JSON array of objects
pub fn write_json(path: &Path, report: &ClassificationReport) -> Result<()> {
    let rows: Vec<Map<String, JsonValue>> = report
        .records
        .iter()
        .map(|record| {
            let mut row = Map::new();
            for (name, value) in &record.observation.attributes {
                row.insert(name.clone(), JsonValue::from(value.clone()));
            }
            for (name, value) in record.result.columns() {
                let value = match value {
                    ColumnValue::Flag(flag) => JsonValue::from(flag),
                    ColumnValue::Distance(distance) => JsonValue::from(distance),
                };
                row.insert(name, value);
            }
            row
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &rows)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {} classified records to {}", report.len(), path.display());
    Ok(())
}

/// Write any serializable value as pretty JSON
pub fn write_geojson<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
