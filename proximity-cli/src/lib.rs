//! Command-line interface for proximity amenity searches.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod logging;
mod search;

pub use error::CliError;
pub use logging::init_logging;

use search::{SearchArgs, run_search};

pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LON: &str = "lon";
pub(crate) const ARG_ADDRESS: &str = "address";
pub(crate) const ARG_CATEGORIES: &str = "categories";
pub(crate) const ARG_RADIUS: &str = "radius";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_RETRIES: &str = "retries";
pub(crate) const ARG_FIXTURE: &str = "fixture";
pub(crate) const ENV_LAT: &str = "PROXIMITY_CMDS_SEARCH_LAT";
pub(crate) const ENV_LON: &str = "PROXIMITY_CMDS_SEARCH_LON";
pub(crate) const ENV_CATEGORIES: &str = "PROXIMITY_CMDS_SEARCH_CATEGORIES";
pub(crate) const ENV_API_KEY: &str = "PROXIMITY_CMDS_SEARCH_API_KEY";

/// Run the proximity CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, the
/// data source cannot be prepared, the search is aborted, or the results
/// cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Search(args) => run_search(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "proximity",
    about = "Find amenities near a property",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for nearby amenities by category.
    Search(SearchArgs),
}

#[cfg(test)]
mod tests;
