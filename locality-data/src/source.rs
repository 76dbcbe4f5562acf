//! Load the governorate list from a hierarchy document on disk.

use std::io::{self, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use locality_core::{CountrySelector, Governorate, LoadError, load_governorates};
use log::debug;
use thiserror::Error;

/// Errors raised while reading the source document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be opened.
    #[error("failed to open source document {path}: {source}")]
    Open {
        /// Path that was opened.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The document was read but its contents were rejected.
    #[error("failed to load hierarchy from {path}: {source}")]
    Load {
        /// Path of the rejected document.
        path: Utf8PathBuf,
        /// Parse or validation failure.
        #[source]
        source: LoadError,
    },
}

/// Read `path` and return the governorates of the selected country.
///
/// # Errors
///
/// Returns [`SourceError::Open`] when the file cannot be opened and
/// [`SourceError::Load`] when the document is malformed or lacks the selected
/// locale or country.
pub fn load_hierarchy_from_path(
    path: &Utf8Path,
    selector: &CountrySelector,
) -> Result<Vec<Governorate>, SourceError> {
    let file = locality_fs::open_file(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let governorates =
        load_governorates(BufReader::new(file), selector).map_err(|source| SourceError::Load {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        "Loaded {} governorates for {}/{} from {path}",
        governorates.len(),
        selector.locale,
        selector.country
    );
    Ok(governorates)
}
