//! Export command: write the flattened hierarchy to one JSON file.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use locality_core::{ConsoleProgress, CountrySelector, Flattener, ProgressReporter, RunSummary};
use locality_data::export_to_path;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::source::{load_source, require_existing, selector};
use crate::{ARG_COUNTRY, ARG_LOCALE, ARG_OUTPUT, ARG_SOURCE, CliError, ENV_EXPORT_SOURCE};

pub(crate) const DEFAULT_OUTPUT: &str = "locations.json";

/// CLI arguments for the `export` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the locality hierarchy, flatten it to one record per \
                 city and write every record to a single JSON array. Options \
                 can come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Write localities to a JSON file"
)]
#[ortho_config(prefix = "LOCALITY")]
pub(crate) struct ExportArgs {
    /// Path to the JSON hierarchy document.
    #[arg(long = ARG_SOURCE, value_name = "path")]
    #[serde(default)]
    pub(crate) source: Option<Utf8PathBuf>,
    /// Destination file (default `locations.json`).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Top-level locale key (default `fr`).
    #[arg(long = ARG_LOCALE, value_name = "key")]
    #[serde(default)]
    pub(crate) locale: Option<String>,
    /// Country name under the locale (default `Tunisie`).
    #[arg(long = ARG_COUNTRY, value_name = "name")]
    #[serde(default)]
    pub(crate) country: Option<String>,
}

impl ExportArgs {
    pub(crate) fn into_config(self) -> Result<ExportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExportConfig::try_from(merged)
    }
}

/// Resolved `export` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportConfig {
    pub(crate) source: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) selector: CountrySelector,
}

impl TryFrom<ExportArgs> for ExportConfig {
    type Error = CliError;

    fn try_from(args: ExportArgs) -> Result<Self, Self::Error> {
        let source = args.source.ok_or(CliError::MissingArgument {
            field: ARG_SOURCE,
            env: ENV_EXPORT_SOURCE,
        })?;
        Ok(Self {
            source,
            output: args
                .output
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT)),
            selector: selector(args.locale, args.country),
        })
    }
}

pub(crate) fn run_export(args: ExportArgs) -> Result<usize, CliError> {
    let mut stdout = std::io::stdout().lock();
    run_export_with(args, &mut stdout)
}

pub(crate) fn run_export_with(args: ExportArgs, writer: &mut dyn Write) -> Result<usize, CliError> {
    let config = args.into_config()?;
    require_existing(&config.source, ARG_SOURCE)?;
    let governorates = load_source(&config.source, &config.selector)?;
    let flattener = Flattener::new(&governorates, &config.selector.country);

    let written = export_to_path(&config.output, flattener.records()).map_err(CliError::Export)?;
    ConsoleProgress::new(writer).finished(&RunSummary::Exported {
        records: written,
        destination: config.output.as_str(),
    });
    Ok(written)
}
