//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Local Repository - Inspect and maintain a local artifact repository
#[derive(Parser, Debug)]
#[command(name = "local-repo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// The local repository directory.
    ///
    /// Defaults to `~/.local-repo/repository`.
    /// Can also be set with the `LOCAL_REPO` environment variable.
    #[arg(long, global = true, value_name = "DIR", env = "LOCAL_REPO")]
    local_repo: Option<PathBuf>,

    /// Repository type used to select the manager (simple, enhanced, default)
    #[arg(long = "type", global = true, value_name = "TYPE", default_value = "")]
    repo_type: String,

    /// Session configuration file (flat YAML mapping)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set a configuration property, overriding the configuration file
    #[arg(short = 'D', global = true, value_name = "KEY=VALUE")]
    define: Vec<String>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the path of an artifact or metadata document
    Path(commands::path::PathArgs),

    /// Check whether artifacts are available in the local repository
    Find(commands::find::FindArgs),

    /// Register the origin of an artifact placed in the local repository
    Add(commands::add::AddArgs),

    /// Inspect and maintain tracking files
    Tracking(commands::tracking::TrackingArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // RUST_LOG, when set, wins over --log-level.
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .try_init();

        let environment = commands::Environment {
            local_repo: self
                .local_repo
                .unwrap_or_else(local_repo::defaults::default_local_repository),
            repo_type: self.repo_type,
            config: self.config,
            defines: self.define,
        };

        match self.command {
            Commands::Path(args) => commands::path::execute(args, &environment),
            Commands::Find(args) => commands::find::execute(args, &environment),
            Commands::Add(args) => commands::add::execute(args, &environment),
            Commands::Tracking(args) => commands::tracking::execute(args, &environment),
        }
    }
}
