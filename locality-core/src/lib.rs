//! Core domain types for the locality ingestion pipeline.
//!
//! Responsibilities:
//! - Model the nested governorate → delegation → city source hierarchy.
//! - Flatten that hierarchy into [`LocationRecord`] values.
//! - Commit records in bounded batches through the [`BatchWriter`] seam.
//!
//! Boundaries:
//! - No filesystem or network I/O; adapters live in `locality-data`.
//! - No global state. Store handles are passed in by the caller.
#![forbid(unsafe_code)]

pub mod batch;
pub mod flatten;
pub mod hierarchy;
pub mod loader;
pub mod progress;
pub mod record;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use batch::{BatchCommitError, CommitSummary, MAX_BATCH_OPERATIONS, commit_in_batches};
pub use flatten::{Flattener, Records, TraversalAnomaly};
pub use hierarchy::{Country, Delegation, Governorate, SourceHierarchy};
pub use loader::{
    CountrySelector, DEFAULT_COUNTRY, DEFAULT_LOCALE, LoadError, load_governorates,
    load_governorates_from_str,
};
pub use progress::{ConsoleProgress, ProgressReporter, RunSummary};
pub use record::{COUNTRY_CODE, LocationRecord, normalise_key};
pub use store::{BatchWriter, CommitError};

#[cfg(test)]
mod tests;
