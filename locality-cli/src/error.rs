//! Error types emitted by the locality-seed CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use locality_core::BatchCommitError;
#[cfg(feature = "store-firestore")]
use locality_data::FirestoreBuildError;
#[cfg(feature = "store-sqlite")]
use locality_data::SqliteStoreError;
use locality_data::{ExportError, SourceError};
use thiserror::Error;

/// Errors emitted by the locality-seed CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the offending option or input.
        field: &'static str,
        /// Environment variable that can supply the option.
        env: &'static str,
    },
    /// An option was supplied with an unusable value.
    #[error("invalid --{field}: {reason}")]
    InvalidArgument {
        /// Name of the offending option or input.
        field: &'static str,
        /// Why the supplied value was rejected.
        reason: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// Cargo feature that must be enabled.
        feature: &'static str,
        /// Operation that needed the feature.
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Name of the offending option or input.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Name of the offending option or input.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Name of the offending option or input.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The source hierarchy could not be read.
    #[error(transparent)]
    LoadSource(#[from] SourceError),
    /// Opening the SQLite document store failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open SQLite store at {path:?}: {source}")]
    OpenSqliteStore {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: SqliteStoreError,
    },
    /// Constructing the Firestore client failed.
    #[cfg(feature = "store-firestore")]
    #[error("failed to prepare Firestore store for project {project:?}: {source}")]
    BuildFirestoreStore {
        /// Firestore project identifier.
        project: String,
        /// Underlying error.
        #[source]
        source: FirestoreBuildError,
    },
    /// A batch commit failed; earlier batches stay committed.
    #[error("import aborted: {0}")]
    Commit(#[source] BatchCommitError),
    /// Writing the export file failed.
    #[error("export failed: {0}")]
    Export(#[source] ExportError),
}
