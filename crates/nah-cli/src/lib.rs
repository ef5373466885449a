//! Command-line front end for the NAH composition engine: argument
//! parsing, on-disk record loading (§6), and human/`--json` rendering of
//! whatever `nah-compose`, `nah-selector`, or `nah-archive` produce. The
//! engine itself stays pure; this crate is the only place that touches a
//! filesystem, an exit code, or a terminal.

pub mod cli;
mod commands;
mod config;
mod error;
mod output;
pub mod tracing_setup;

pub use cli::Cli;
pub use tracing_setup::setup_tracing;

use clap::Parser;

/// Parse arguments, initialize logging at the requested verbosity, run
/// the selected subcommand, and exit with its resulting status code.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.verbose, cli.debug);
    let exit_code = commands::dispatch(&cli)?;
    std::process::exit(exit_code);
}
