//! JSON file export of flattened location records.
//!
//! The export materialises every record, serialises them as one pretty-printed
//! array and replaces the destination file atomically. There is no store
//! timestamp in this mode.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use locality_core::LocationRecord;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Latitude/longitude pair nested under each exported record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

/// One element of the exported JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// City name.
    pub name: String,
    /// Lowercased search key.
    pub name_lower: String,
    /// Owning governorate.
    pub governorate: String,
    /// Owning governorate code.
    pub governorate_code: String,
    /// Owning delegation.
    pub delegation: String,
    /// Country name.
    pub country: String,
    /// Country code, always `TN`.
    pub country_code: String,
    /// Governorate centroid.
    pub coordinates: Coordinates,
}

impl From<LocationRecord> for ExportDocument {
    fn from(record: LocationRecord) -> Self {
        let coordinates = Coordinates {
            latitude: record.latitude(),
            longitude: record.longitude(),
        };
        Self {
            name: record.name,
            name_lower: record.name_lower,
            governorate: record.governorate,
            governorate_code: record.governorate_code,
            delegation: record.delegation,
            country: record.country,
            country_code: record.country_code.to_owned(),
            coordinates,
        }
    }
}

/// Errors raised while exporting records.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialising the record array failed.
    #[error("failed to serialise export document: {source}")]
    Serialise {
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The destination file could not be written.
    #[error("failed to write export file {path}: {source}")]
    Write {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Write `records` to `path` as one JSON array and return how many were
/// written.
///
/// Missing parent directories are created. An existing file is replaced only
/// once the new contents are fully written.
///
/// # Errors
///
/// Returns [`ExportError::Write`] when the file cannot be created or replaced.
pub fn export_to_path<I>(path: &Utf8Path, records: I) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = LocationRecord>,
{
    let documents: Vec<ExportDocument> = records.into_iter().map(ExportDocument::from).collect();
    debug!("Serialising {} records for {path}", documents.len());

    let mut bytes =
        serde_json::to_vec_pretty(&documents).map_err(|source| ExportError::Serialise { source })?;
    bytes.push(b'\n');
    locality_fs::write_file_atomically(path, &bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Exported {} records to {path}", documents.len());
    Ok(documents.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use locality_core::{Delegation, Flattener, Governorate};
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn governorates() -> Vec<Governorate> {
        vec![
            Governorate::new(
                "Tunis",
                "11",
                Coord {
                    x: 10.1815,
                    y: 36.8065,
                },
            )
            .with_delegation(Delegation::new("La Marsa", ["Alpha", "Beta"])),
        ]
    }

    fn utf8(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 temp path")
    }

    #[rstest]
    fn writes_snake_case_documents_with_nested_coordinates(governorates: Vec<Governorate>) {
        let dir = TempDir::new().expect("temp dir");
        let path = utf8(&dir, "locations.json");
        let flattener = Flattener::new(&governorates, "Tunisie");

        let written = export_to_path(&path, flattener.records()).expect("export");
        assert_eq!(written, 2);

        let text = fs::read_to_string(&path).expect("read export");
        assert!(text.ends_with("]\n"));
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        let first = value.get(0).expect("first element");
        assert_eq!(first["governorate_code"], "11");
        assert_eq!(first["country_code"], "TN");
        assert_eq!(first["coordinates"]["latitude"], 36.8065);
        assert_eq!(first["coordinates"]["longitude"], 10.1815);
        assert!(first.get("createdAt").is_none());
        assert!(first.get("created_at").is_none());
    }

    #[rstest]
    fn empty_sequences_produce_an_empty_array() {
        let dir = TempDir::new().expect("temp dir");
        let path = utf8(&dir, "nested/dir/locations.json");

        let written = export_to_path(&path, std::iter::empty()).expect("export");

        assert_eq!(written, 0);
        assert_eq!(fs::read_to_string(&path).expect("read export"), "[]\n");
    }

    #[rstest]
    fn unwritable_destination_is_a_write_error(governorates: Vec<Governorate>) {
        let dir = TempDir::new().expect("temp dir");
        let blocker = utf8(&dir, "blocker");
        fs::write(&blocker, "file, not a directory").expect("write blocker");
        let path = blocker.join("locations.json");
        let flattener = Flattener::new(&governorates, "Tunisie");

        let err = export_to_path(&path, flattener.records()).expect_err("cannot write");
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
