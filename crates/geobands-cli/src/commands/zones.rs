//! Zones command implementation

use crate::cli::{Cli, ZonesArgs};
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{MapOutput, ZonesOutput};
use crate::storage::{load_observations, write_geojson};
use anyhow::{anyhow, bail, Context, Result};
use geobands_core::ClassificationConfig;
use geobands_geo::map::{observations_feature_collection, zones_feature_collection};
use geobands_geo::ClassificationPipeline;
use std::path::Path;

pub fn execute(cli: &Cli, args: &ZonesArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config_with_overrides(cli)?
        .resolve()
        .context("Invalid configuration")?;

    let pipeline =
        ClassificationPipeline::from_config(&config).context("Failed to prepare reference zones")?;

    let zones = zones_feature_collection(&pipeline);
    write_geojson(&args.output, &zones)?;

    let map = match (&args.observations, &args.observations_output) {
        (Some(input), Some(map_output)) => Some(export_map(
            &config,
            &pipeline,
            input,
            map_output,
            args.center.as_deref(),
        )?),
        _ => None,
    };

    if output.is_json() {
        output.result(ZonesOutput {
            output: args.output.display().to_string(),
            zone_count: pipeline.zones().len(),
            map,
        })?;
        return Ok(());
    }

    output.success(format!(
        "Wrote {} and {} buffer zone(s) to {}",
        pipeline.boundary_name(),
        pipeline.zones().len(),
        args.output.display()
    ));

    if let Some(map) = map {
        output.success(format!(
            "Wrote {} of {} observations within {} {} of {} to {}",
            map.mapped, map.classified, map.max_distance, map.unit, map.center, map.output
        ));
    }

    Ok(())
}

fn export_map(
    config: &ClassificationConfig,
    pipeline: &ClassificationPipeline,
    input: &Path,
    map_output: &Path,
    center: Option<&str>,
) -> Result<MapOutput> {
    let center = match center {
        Some(name) if pipeline.center(name).is_none() => {
            let known: Vec<&str> = pipeline.centers().iter().map(|c| c.center.name()).collect();
            bail!("Unknown center '{}' (configured: {})", name, known.join(", "));
        }
        Some(name) => name.to_string(),
        None => pipeline
            .centers()
            .first()
            .map(|c| c.center.name().to_string())
            .ok_or_else(|| anyhow!("No centers configured"))?,
    };

    let table = load_observations(input, &config.input)?;
    let report = pipeline.run(&table.observations).context("Classification failed")?;

    let collection = observations_feature_collection(&report, &center, config.max_map_distance)
        .with_context(|| format!("Failed to prepare map around '{}'", center))?;
    write_geojson(map_output, &collection)?;

    Ok(MapOutput {
        output: map_output.display().to_string(),
        center,
        max_distance: config.max_map_distance,
        unit: pipeline.unit().plural().to_string(),
        mapped: collection.features.len(),
        classified: report.len(),
    })
}
