//! Source validation and loading shared by both commands.

use camino::Utf8Path;
use locality_core::{CountrySelector, DEFAULT_COUNTRY, DEFAULT_LOCALE, Flattener, Governorate};
use locality_data::load_hierarchy_from_path;
use log::{debug, info};

use crate::CliError;

/// Selector from the merged `--locale`/`--country` options.
pub(crate) fn selector(locale: Option<String>, country: Option<String>) -> CountrySelector {
    CountrySelector::new(
        locale.unwrap_or_else(|| DEFAULT_LOCALE.to_owned()),
        country.unwrap_or_else(|| DEFAULT_COUNTRY.to_owned()),
    )
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match locality_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load the selected country and log what flattening will skip.
pub(crate) fn load_source(
    path: &Utf8Path,
    selector: &CountrySelector,
) -> Result<Vec<Governorate>, CliError> {
    let governorates = load_hierarchy_from_path(path, selector)?;
    let flattener = Flattener::new(&governorates, &selector.country);
    for anomaly in flattener.anomalies() {
        debug!("Skipping {anomaly}");
    }
    info!(
        "Loaded {} governorates with {} locations from {path}",
        governorates.len(),
        flattener.record_count()
    );
    Ok(governorates)
}
