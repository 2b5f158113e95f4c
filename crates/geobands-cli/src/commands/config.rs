//! Config command implementation

use crate::cli::Cli;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use tabled::Tabled;

pub fn execute(cli: &Cli, output: &OutputWriter) -> Result<()> {
    let layered = load_config_with_overrides(cli)?;
    let file_found = cli.config.exists();

    let mut values: Vec<ConfigEntry> = layered
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source: format!("{:?}", source) })
        .collect();

    // Sort by key for consistent output
    values.sort_by(|a, b| a.key.cmp(&b.key));

    let error = layered.resolve().err().map(|e| e.to_string());

    if output.is_json() {
        output.result(ConfigOutput {
            path: cli.config.display().to_string(),
            file_found,
            values,
            error,
        })?;
        return Ok(());
    }

    output.section("Configuration File");
    if file_found {
        output.kv("Path", cli.config.display());
    } else {
        output.info(format!("{} not found, showing defaults", cli.config.display()));
    }

    output.section("Configuration Values");

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    output.table(
        values
            .into_iter()
            .map(|e| ConfigRow { key: e.key, value: e.value, source: e.source })
            .collect::<Vec<_>>(),
    );

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables > Config file > Defaults");

    match error {
        Some(error) => output.warning(format!("Configuration is not usable yet: {}", error)),
        None => output.success("Configuration is valid"),
    }

    Ok(())
}
