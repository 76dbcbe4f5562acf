//! Command-line interface for seeding the locality reference data.
//!
//! `import` commits the flattened hierarchy to a document store in batches of
//! at most 500 writes; `export` writes it to one JSON file. Options are layered
//! from CLI flags, configuration files and `LOCALITY_*` environment variables.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod export;
mod import;
mod source;

pub use error::CliError;

use export::{ExportArgs, run_export};
use import::{ImportArgs, run_import};

pub(crate) const ARG_SOURCE: &str = "source";
pub(crate) const ARG_LOCALE: &str = "locale";
pub(crate) const ARG_COUNTRY: &str = "country";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_STORE: &str = "store";
pub(crate) const ARG_SQLITE_PATH: &str = "sqlite-path";
pub(crate) const ARG_FIRESTORE_PROJECT: &str = "firestore-project";
pub(crate) const ARG_FIRESTORE_DATABASE: &str = "firestore-database";
pub(crate) const ARG_FIRESTORE_COLLECTION: &str = "firestore-collection";
pub(crate) const ARG_FIRESTORE_BASE_URL: &str = "firestore-base-url";
pub(crate) const ARG_FIRESTORE_TOKEN: &str = "firestore-token";
pub(crate) const ARG_COMMIT_TIMEOUT_SECS: &str = "commit-timeout-secs";
pub(crate) const ENV_IMPORT_SOURCE: &str = "LOCALITY_CMDS_IMPORT_SOURCE";
#[cfg(feature = "store-firestore")]
pub(crate) const ENV_IMPORT_FIRESTORE_PROJECT: &str = "LOCALITY_CMDS_IMPORT_FIRESTORE_PROJECT";
pub(crate) const ENV_EXPORT_SOURCE: &str = "LOCALITY_CMDS_EXPORT_SOURCE";

/// Run the CLI with the current process arguments and environment.
///
/// Progress lines are written to standard output.
///
/// # Errors
///
/// Returns [`CliError`] when arguments are invalid, the source cannot be
/// loaded, or the import or export fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Import(args) => run_import(args).map(|_| ()),
        Command::Export(args) => run_export(args).map(|_| ()),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "locality-seed",
    about = "Seed the Tunisian locality reference data into a document store",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Commit every locality to a document store in bounded batches.
    Import(ImportArgs),
    /// Write every locality to a single JSON file.
    Export(ExportArgs),
}

#[cfg(test)]
mod tests;
