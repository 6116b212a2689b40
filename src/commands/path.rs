//! # Path Command Implementation
//!
//! Prints where an artifact or metadata document lives in the local
//! repository. Without `--repo` the path of a local install (or of local
//! metadata) is printed; with `--repo` the path of a copy downloaded from
//! that repository.
//!
//! This command is read-only and does not touch the disk beyond opening the
//! session.

use anyhow::{Context, Result};
use clap::Args;

use local_repo::artifact::{Artifact, Metadata};

use super::{parse_repository, Environment};

/// Print the path of an artifact or metadata document
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Coordinate `group:artifact[:extension[:classifier]]:version`, or
    /// `group:artifact:version:type` with --metadata
    #[arg(value_name = "COORDINATE")]
    pub coordinate: String,

    /// Remote repository the file is downloaded from
    #[arg(long, value_name = "ID[=URL]")]
    pub repo: Option<String>,

    /// Resolution context of the download
    #[arg(long, value_name = "CONTEXT", default_value = "")]
    pub context: String,

    /// Treat the coordinate as a metadata coordinate
    #[arg(long)]
    pub metadata: bool,

    /// Print the absolute path instead of the repository relative one
    #[arg(long)]
    pub absolute: bool,
}

/// Execute the `path` command.
pub fn execute(args: PathArgs, environment: &Environment) -> Result<()> {
    let repository = args.repo.as_deref().map(parse_repository).transpose()?;
    let open = environment.open()?;
    let manager = open.session().manager();

    let relative = if args.metadata {
        let metadata: Metadata = args
            .coordinate
            .parse()
            .with_context(|| format!("Cannot parse metadata coordinate '{}'", args.coordinate))?;
        match &repository {
            Some(repository) => {
                manager.path_for_remote_metadata(&metadata, repository, &args.context)
            }
            None => manager.path_for_local_metadata(&metadata),
        }
    } else {
        let artifact: Artifact = args
            .coordinate
            .parse()
            .with_context(|| format!("Cannot parse artifact coordinate '{}'", args.coordinate))?;
        match &repository {
            Some(repository) => {
                manager.path_for_remote_artifact(&artifact, repository, &args.context)
            }
            None => manager.path_for_local_artifact(&artifact),
        }
    };

    if args.absolute {
        println!("{}", manager.resolve(&relative).display());
    } else {
        println!("{}", relative);
    }
    open.end()
}
