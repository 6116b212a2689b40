//! # Local Repository CLI
//!
//! Binary entry point of the `local-repo` tool, which exposes path
//! composition, availability checks, provenance registration and tracking
//! file maintenance of a local repository on the command line.
//!
//! Every subcommand opens a session through the library, so the manager is
//! selected exactly as an embedding resolver would select it. Errors are
//! reported through `anyhow` with their full cause chain.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    cli::Cli::parse().execute()
}
