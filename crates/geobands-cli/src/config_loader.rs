//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use geobands_core::config::{parse_distance_unit, parse_radii, CliConfigOverrides, LayeredConfig};
use std::path::Path;
use tracing::debug;

use crate::cli::Cli;

/// Load layered configuration: defaults, then the file (if present), then the environment
pub fn load_config(path: &Path) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();

    let config = if path.exists() {
        config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?
    } else {
        debug!("No configuration file at {}, using defaults", path.display());
        config
    };

    Ok(config.load_from_env())
}

/// Load layered configuration with the global CLI flags applied on top
pub fn load_config_with_overrides(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = load_config(&cli.config)?;
    config.update_from_cli(overrides_from_cli(cli)?);
    Ok(config)
}

/// Collect the configuration overrides given as global flags
pub fn overrides_from_cli(cli: &Cli) -> Result<CliConfigOverrides> {
    let distance_unit = cli
        .distance_unit
        .as_deref()
        .map(parse_distance_unit)
        .transpose()
        .context("Invalid --distance-unit")?;

    let radii = cli.radii.as_deref().map(parse_radii).transpose().context("Invalid --radii")?;

    Ok(CliConfigOverrides {
        planar_crs: cli.planar_crs,
        distance_unit,
        radii,
        max_map_distance: cli.max_distance,
    })
}
