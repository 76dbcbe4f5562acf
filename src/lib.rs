//! Facade crate for the locality reference-data pipeline.
//!
//! This crate re-exports the core domain types and the file adapters, and
//! exposes the document store implementations behind feature flags.

#![forbid(unsafe_code)]

pub use locality_core::{
    BatchCommitError, BatchWriter, CommitError, CommitSummary, ConsoleProgress, CountrySelector,
    Delegation, Flattener, Governorate, LoadError, LocationRecord, MAX_BATCH_OPERATIONS,
    ProgressReporter, RunSummary, TraversalAnomaly, commit_in_batches, load_governorates,
};
pub use locality_data::{
    ExportDocument, ExportError, SourceError, export_to_path, load_hierarchy_from_path,
};

#[cfg(feature = "store-sqlite")]
pub use locality_data::{SqliteDocumentStore, SqliteStoreError};

#[cfg(feature = "store-firestore")]
pub use locality_data::{FirestoreBuildError, FirestoreConfig, FirestoreDocumentStore};

#[cfg(feature = "test-support")]
pub use locality_core::test_support;
