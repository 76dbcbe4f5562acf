//! SQLite-backed document store for location records.
//!
//! Each [`BatchWriter::commit_batch`] call is one transaction, so a failed
//! batch leaves no partial rows. `created_at` is filled by SQLite at insert
//! time.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use locality_core::{BatchWriter, CommitError, LocationRecord, MAX_BATCH_OPERATIONS};
use log::debug;
use rusqlite::{Connection, Error as SqliteError, ErrorCode, Transaction};
use thiserror::Error;

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_lower TEXT NOT NULL,
        governorate TEXT NOT NULL,
        governorate_code TEXT NOT NULL,
        delegation TEXT NOT NULL,
        country TEXT NOT NULL,
        country_code TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );
    CREATE INDEX IF NOT EXISTS locations_name_lower ON locations (name_lower);
";

const INSERT_LOCATION: &str = "
    INSERT INTO locations (
        name, name_lower, governorate, governorate_code, delegation,
        country, country_code, latitude, longitude
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
";

/// Errors raised while opening or inspecting a [`SqliteDocumentStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory for {path}: {source}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `locations` table failed.
    #[error("failed to create locations table: {source}")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Counting stored documents failed.
    #[error("failed to count stored locations: {source}")]
    Count {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Local document collection stored in a SQLite table named `locations`.
///
/// Every commit inserts new rows; re-importing the same hierarchy duplicates
/// it.
#[derive(Debug)]
pub struct SqliteDocumentStore {
    connection: Connection,
}

impl SqliteDocumentStore {
    /// Open or create the database at `path`, creating parent directories and
    /// the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the directory, database or schema
    /// cannot be created.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStoreError> {
        locality_fs::ensure_parent_dir(path).map_err(|source| {
            SqliteStoreError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SqliteStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Opened SQLite document store at {path}");
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| SqliteStoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteStoreError> {
        connection
            .execute_batch(CREATE_SCHEMA)
            .map_err(|source| SqliteStoreError::CreateSchema { source })?;
        Ok(Self { connection })
    }

    /// Number of documents currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Count`] when the query fails.
    pub fn document_count(&self) -> Result<usize, SqliteStoreError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))
            .map_err(|source| SqliteStoreError::Count { source })?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl BatchWriter for SqliteDocumentStore {
    fn commit_batch(&mut self, batch: &[LocationRecord]) -> Result<(), CommitError> {
        if batch.len() > MAX_BATCH_OPERATIONS {
            return Err(CommitError::BatchTooLarge {
                size: batch.len(),
                limit: MAX_BATCH_OPERATIONS,
            });
        }

        let transaction = self
            .connection
            .transaction()
            .map_err(|err| commit_error("begin transaction", &err))?;
        insert_rows(&transaction, batch)?;
        transaction
            .commit()
            .map_err(|err| commit_error("commit transaction", &err))
    }
}

fn insert_rows(transaction: &Transaction<'_>, batch: &[LocationRecord]) -> Result<(), CommitError> {
    let mut statement = transaction
        .prepare_cached(INSERT_LOCATION)
        .map_err(|err| commit_error("prepare insert", &err))?;
    for record in batch {
        statement
            .execute((
                &record.name,
                &record.name_lower,
                &record.governorate,
                &record.governorate_code,
                &record.delegation,
                &record.country,
                record.country_code,
                record.latitude(),
                record.longitude(),
            ))
            .map_err(|err| commit_error(&format!("insert {}", record.name), &err))?;
    }
    Ok(())
}

/// Constraint failures are rejections; anything else is the store failing.
fn commit_error(operation: &str, err: &SqliteError) -> CommitError {
    let message = format!("{operation}: {err}");
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation | ErrorCode::TooBig) => {
            CommitError::Rejected { message }
        }
        _ => CommitError::Unavailable { message },
    }
}
