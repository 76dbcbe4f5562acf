//! Entry point for the locality-seed command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;
use locality_cli::CliError;
use log::error;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = locality_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        error!("{err}");
        std::process::exit(1);
    }
}
