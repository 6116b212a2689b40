//! # Add Command Implementation
//!
//! Registers the origin of an artifact file that has already been placed in
//! the local repository: a local install without `--repo`, a download from
//! the given repository otherwise.
//!
//! Registration runs under an exclusive sync context. Other processes are
//! serialized by the tracking file lock, so several `add` invocations may
//! safely target the same directory at once.

use anyhow::{bail, Context, Result};
use clap::Args;

use local_repo::artifact::Artifact;
use local_repo::manager::LocalArtifactRegistration;

use super::{parse_repository, Environment};

/// Register the origin of an artifact placed in the local repository
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Artifact coordinate `group:artifact[:extension[:classifier]]:version`
    #[arg(value_name = "COORDINATE")]
    pub coordinate: String,

    /// Remote repository the file was downloaded from; omit for a local install
    #[arg(long, value_name = "ID[=URL]")]
    pub repo: Option<String>,

    /// Resolution context the download is valid for (repeatable)
    #[arg(long = "context", value_name = "CONTEXT", default_value = "")]
    pub contexts: Vec<String>,

    /// Register even if no file exists at the artifact's path yet
    #[arg(long)]
    pub force: bool,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, environment: &Environment) -> Result<()> {
    let artifact: Artifact = args
        .coordinate
        .parse()
        .with_context(|| format!("Cannot parse artifact coordinate '{}'", args.coordinate))?;
    let repository = args.repo.as_deref().map(parse_repository).transpose()?;

    let open = environment.open()?;
    let manager = open.session().manager();

    let registration = match &repository {
        Some(repository) => {
            LocalArtifactRegistration::remote(artifact.clone(), repository.clone(), args.contexts)
        }
        None => LocalArtifactRegistration::local(artifact.clone()),
    };
    let relative_paths: Vec<String> = match &repository {
        Some(repository) => registration
            .contexts
            .iter()
            .map(|context| manager.path_for_remote_artifact(&artifact, repository, context))
            .collect(),
        None => vec![manager.path_for_local_artifact(&artifact)],
    };
    if !args.force {
        for relative in &relative_paths {
            let file = manager.resolve(relative);
            if !file.is_file() {
                bail!(
                    "No file for {} at {}; place the artifact before registering it",
                    artifact,
                    file.display()
                );
            }
        }
    }

    let mut sync = open.session().sync_context(false);
    sync.acquire();
    manager
        .add(&registration)
        .with_context(|| format!("Failed to register {}", artifact))?;
    sync.close();

    let origin = repository
        .as_ref()
        .map(|r| r.id().to_string())
        .unwrap_or_else(|| "local install".to_string());
    for relative in &relative_paths {
        println!("Registered {} ({}) at {}", artifact, origin, relative);
    }
    open.end()
}
