//! Import command: commit the flattened hierarchy to a document store.

use std::io::Write;
#[cfg(feature = "store-firestore")]
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use locality_core::batch::planned_batches;
use locality_core::{
    BatchWriter, CommitSummary, ConsoleProgress, CountrySelector, Flattener, ProgressReporter,
    RunSummary, commit_in_batches,
};
#[cfg(feature = "store-firestore")]
use locality_data::firestore::{DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_TIMEOUT_SECS};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::source::{load_source, require_existing, selector};
#[cfg(feature = "store-firestore")]
use crate::ENV_IMPORT_FIRESTORE_PROJECT;
use crate::{
    ARG_COMMIT_TIMEOUT_SECS, ARG_COUNTRY, ARG_FIRESTORE_BASE_URL, ARG_FIRESTORE_COLLECTION,
    ARG_FIRESTORE_DATABASE, ARG_FIRESTORE_PROJECT, ARG_FIRESTORE_TOKEN, ARG_LOCALE, ARG_SOURCE,
    ARG_SQLITE_PATH, ARG_STORE, CliError, ENV_IMPORT_SOURCE,
};

pub(crate) const DEFAULT_SQLITE_PATH: &str = "locations.db";
#[cfg(feature = "store-firestore")]
const USER_AGENT: &str = concat!("locality-seed/", env!("CARGO_PKG_VERSION"));

/// Destination document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StoreKind {
    /// Local SQLite collection.
    #[default]
    Sqlite,
    /// Firestore REST API.
    Firestore,
}

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the locality hierarchy, flatten it to one record per \
                 city and commit the records to a document store in batches \
                 of at most 500 writes. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Commit localities to a document store"
)]
#[ortho_config(prefix = "LOCALITY")]
pub(crate) struct ImportArgs {
    /// Path to the JSON hierarchy document.
    #[arg(long = ARG_SOURCE, value_name = "path")]
    #[serde(default)]
    pub(crate) source: Option<Utf8PathBuf>,
    /// Top-level locale key (default `fr`).
    #[arg(long = ARG_LOCALE, value_name = "key")]
    #[serde(default)]
    pub(crate) locale: Option<String>,
    /// Country name under the locale (default `Tunisie`).
    #[arg(long = ARG_COUNTRY, value_name = "name")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Destination store (default `sqlite`).
    #[arg(long = ARG_STORE, value_enum)]
    #[serde(default)]
    pub(crate) store: Option<StoreKind>,
    /// SQLite database path (default `locations.db`).
    #[arg(long = ARG_SQLITE_PATH, value_name = "path")]
    #[serde(default)]
    pub(crate) sqlite_path: Option<Utf8PathBuf>,
    /// Google Cloud project id; required for the Firestore store.
    #[arg(long = ARG_FIRESTORE_PROJECT, value_name = "id")]
    #[serde(default)]
    pub(crate) firestore_project: Option<String>,
    /// Firestore database id (default `(default)`).
    #[arg(long = ARG_FIRESTORE_DATABASE, value_name = "id")]
    #[serde(default)]
    pub(crate) firestore_database: Option<String>,
    /// Firestore collection id (default `locations`).
    #[arg(long = ARG_FIRESTORE_COLLECTION, value_name = "id")]
    #[serde(default)]
    pub(crate) firestore_collection: Option<String>,
    /// Override the Firestore REST endpoint, e.g. an emulator.
    #[arg(long = ARG_FIRESTORE_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) firestore_base_url: Option<String>,
    /// OAuth bearer token for Firestore requests.
    #[arg(long = ARG_FIRESTORE_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) firestore_token: Option<String>,
    /// Per-commit timeout in seconds for remote stores (default 30).
    #[arg(long = ARG_COMMIT_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) commit_timeout_secs: Option<u64>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Firestore connection settings after defaults are applied.
#[cfg(feature = "store-firestore")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FirestoreSettings {
    pub(crate) project: String,
    pub(crate) database: String,
    pub(crate) collection: String,
    pub(crate) base_url: Option<String>,
    pub(crate) token: Option<String>,
    pub(crate) timeout: Duration,
}

/// Resolved destination store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreConfig {
    Sqlite { path: Utf8PathBuf },
    #[cfg(feature = "store-firestore")]
    Firestore(FirestoreSettings),
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) source: Utf8PathBuf,
    pub(crate) selector: CountrySelector,
    pub(crate) store: StoreConfig,
}

impl ImportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.source, ARG_SOURCE)
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let source = args.source.clone().ok_or(CliError::MissingArgument {
            field: ARG_SOURCE,
            env: ENV_IMPORT_SOURCE,
        })?;
        let store = match args.store.unwrap_or_default() {
            StoreKind::Sqlite => StoreConfig::Sqlite {
                path: args
                    .sqlite_path
                    .clone()
                    .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SQLITE_PATH)),
            },
            StoreKind::Firestore => firestore_store(&args)?,
        };
        Ok(Self {
            source,
            selector: selector(args.locale, args.country),
            store,
        })
    }
}

#[cfg(feature = "store-firestore")]
fn firestore_store(args: &ImportArgs) -> Result<StoreConfig, CliError> {
    let project = args
        .firestore_project
        .clone()
        .filter(|project| !project.trim().is_empty())
        .ok_or(CliError::MissingArgument {
            field: ARG_FIRESTORE_PROJECT,
            env: ENV_IMPORT_FIRESTORE_PROJECT,
        })?;
    let timeout_secs = args.commit_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(CliError::InvalidArgument {
            field: ARG_COMMIT_TIMEOUT_SECS,
            reason: "timeout must be at least one second",
        });
    }
    Ok(StoreConfig::Firestore(FirestoreSettings {
        project,
        database: args
            .firestore_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_owned()),
        collection: args
            .firestore_collection
            .clone()
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_owned()),
        base_url: args.firestore_base_url.clone(),
        token: args.firestore_token.clone(),
        timeout: Duration::from_secs(timeout_secs),
    }))
}

#[cfg(not(feature = "store-firestore"))]
fn firestore_store(_args: &ImportArgs) -> Result<StoreConfig, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-firestore",
        action: "importing into Firestore",
    })
}

/// Builds the destination store for the current import invocation.
pub(crate) trait StoreBuilder {
    fn build(&self, config: &StoreConfig) -> Result<Box<dyn BatchWriter>, CliError>;
}

pub(crate) struct DefaultStoreBuilder;

impl StoreBuilder for DefaultStoreBuilder {
    fn build(&self, config: &StoreConfig) -> Result<Box<dyn BatchWriter>, CliError> {
        match config {
            StoreConfig::Sqlite { path } => open_sqlite(path),
            #[cfg(feature = "store-firestore")]
            StoreConfig::Firestore(settings) => open_firestore(settings),
        }
    }
}

#[cfg(feature = "store-sqlite")]
fn open_sqlite(path: &camino::Utf8Path) -> Result<Box<dyn BatchWriter>, CliError> {
    let store = locality_data::SqliteDocumentStore::open(path).map_err(|source| {
        CliError::OpenSqliteStore {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "store-sqlite"))]
fn open_sqlite(_path: &camino::Utf8Path) -> Result<Box<dyn BatchWriter>, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "importing into SQLite",
    })
}

#[cfg(feature = "store-firestore")]
fn open_firestore(settings: &FirestoreSettings) -> Result<Box<dyn BatchWriter>, CliError> {
    use locality_data::{FirestoreConfig, FirestoreDocumentStore};

    let mut config = FirestoreConfig::new(settings.project.clone())
        .with_database(settings.database.clone())
        .with_collection(settings.collection.clone())
        .with_timeout(settings.timeout)
        .with_user_agent(USER_AGENT);
    if let Some(base_url) = &settings.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(token) = &settings.token {
        config = config.with_bearer_token(token.clone());
    }
    let store = FirestoreDocumentStore::with_config(config).map_err(|source| {
        CliError::BuildFirestoreStore {
            project: settings.project.clone(),
            source,
        }
    })?;
    Ok(Box::new(store))
}

pub(crate) fn run_import(args: ImportArgs) -> Result<CommitSummary, CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &DefaultStoreBuilder, &mut stdout)
}

pub(crate) fn run_import_with(
    args: ImportArgs,
    builder: &dyn StoreBuilder,
    writer: &mut dyn Write,
) -> Result<CommitSummary, CliError> {
    let config = resolve_import_config(args)?;
    let governorates = load_source(&config.source, &config.selector)?;
    let flattener = Flattener::new(&governorates, &config.selector.country);
    let records = flattener.record_count();
    info!(
        "Importing {records} locations in {} batches",
        planned_batches(records)
    );

    let mut store = builder.build(&config.store)?;
    let mut progress = ConsoleProgress::new(writer);
    let summary = commit_in_batches(store.as_mut(), flattener.records(), &mut progress)
        .map_err(CliError::Commit)?;
    progress.finished(&RunSummary::Imported {
        records: summary.committed,
        batches: summary.batches,
    });
    Ok(summary)
}

fn resolve_import_config(args: ImportArgs) -> Result<ImportConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}
