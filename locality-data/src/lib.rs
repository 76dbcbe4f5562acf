//! Adapters connecting the locality pipeline to files and document stores.
//!
//! - [`source`] reads the nested hierarchy document from disk.
//! - [`export`] writes flattened records to a single JSON file.
//! - [`sqlite`] stores records in a local SQLite collection (`store-sqlite`).
//! - [`firestore`] commits records through the Firestore REST API
//!   (`store-firestore`).
#![forbid(unsafe_code)]

pub mod export;
#[cfg(feature = "store-firestore")]
pub mod firestore;
pub mod source;
#[cfg(feature = "store-sqlite")]
pub mod sqlite;

pub use export::{Coordinates, ExportDocument, ExportError, export_to_path};
#[cfg(feature = "store-firestore")]
pub use firestore::{FirestoreBuildError, FirestoreConfig, FirestoreDocumentStore};
pub use source::{SourceError, load_hierarchy_from_path};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteDocumentStore, SqliteStoreError};
