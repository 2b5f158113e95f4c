//! Classify command implementation

use crate::cli::{ClassifyArgs, Cli, TableFormat};
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{ClassifyOutput, ExcludedInfo, ZoneCount};
use crate::storage::{load_observations, write_csv, write_json};
use anyhow::{Context, Result};
use chrono::Utc;
use geobands_geo::ClassificationPipeline;
use tabled::Tabled;

pub fn execute(cli: &Cli, args: &ClassifyArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config_with_overrides(cli)?
        .resolve()
        .context("Invalid configuration")?;

    let table = load_observations(&args.input, &config.input)?;
    if table.dropped > 0 {
        output.warning(format!("Dropped {} row(s) with missing coordinates", table.dropped));
    }

    let pipeline =
        ClassificationPipeline::from_config(&config).context("Failed to prepare reference zones")?;
    let report = pipeline.run(&table.observations).context("Classification failed")?;

    match args.format {
        TableFormat::Csv => write_csv(&args.output, &table.headers, &report)?,
        TableFormat::Json => write_json(&args.output, &report)?,
    }

    let zone_counts = report.zone_counts();
    let boundary_column = format!("within_{}", pipeline.boundary_name());

    if output.is_json() {
        output.result(ClassifyOutput {
            input: args.input.display().to_string(),
            output: args.output.display().to_string(),
            classified: report.len(),
            dropped: table.dropped,
            excluded: report
                .excluded
                .iter()
                .map(|e| ExcludedInfo { id: e.id, reason: e.reason.clone() })
                .collect(),
            boundary_column,
            within_boundary: report.count_within_boundary(),
            zones: zone_counts
                .into_iter()
                .map(|(column, count)| ZoneCount { column, count })
                .collect(),
            unit: report.unit.plural().to_string(),
            finished_at: Utc::now(),
        })?;
        return Ok(());
    }

    output.success(format!(
        "Classified {} observations into {}",
        report.len(),
        args.output.display()
    ));

    output.section("Summary");
    output.kv("Classified", report.len());
    output.kv("Dropped (missing coordinates)", table.dropped);
    output.kv("Excluded (invalid coordinates)", report.excluded_count());
    output.kv(&boundary_column, report.count_within_boundary());

    #[derive(Tabled)]
    struct ZoneRow {
        #[tabled(rename = "Zone")]
        column: String,
        #[tabled(rename = "Observations")]
        count: usize,
    }

    output.section("Zones");
    output.table(
        zone_counts
            .into_iter()
            .map(|(column, count)| ZoneRow { column, count })
            .collect::<Vec<_>>(),
    );

    for excluded in &report.excluded {
        output.warning(format!("Observation {} excluded: {}", excluded.id, excluded.reason));
    }

    Ok(())
}
