//! # Find Command Implementation
//!
//! Checks several coordinates against the local repository in parallel and
//! prints, for each one, whether a copy acceptable for the given
//! repositories and context is cached.
//!
//! The lookups run under a shared sync context, so they can overlap with
//! other readers but not with a concurrent `add` of this process.

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;

use local_repo::artifact::Artifact;
use local_repo::manager::{LocalArtifactRequest, LocalArtifactResult};

use super::{parse_repository, Environment};

/// Check whether artifacts are available in the local repository
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Artifact coordinates `group:artifact[:extension[:classifier]]:version`
    #[arg(value_name = "COORDINATE", required = true)]
    pub coordinates: Vec<String>,

    /// Remote repository the artifact may come from (repeatable, in order)
    #[arg(long = "repo", value_name = "ID[=URL]")]
    pub repos: Vec<String>,

    /// Resolution context of the request
    #[arg(long, value_name = "CONTEXT", default_value = "")]
    pub context: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Availability of one coordinate
#[derive(Debug, Serialize)]
struct FindOutput {
    coordinate: String,
    available: bool,
    path: Option<String>,
    repository: Option<String>,
}

impl FindOutput {
    fn new(coordinate: &str, result: LocalArtifactResult) -> Self {
        Self {
            coordinate: coordinate.to_string(),
            available: result.available,
            path: result.path.map(|p| p.display().to_string()),
            repository: result.repository.map(|r| r.id().to_string()),
        }
    }
}

/// Execute the `find` command.
pub fn execute(args: FindArgs, environment: &Environment) -> Result<()> {
    let repositories = args
        .repos
        .iter()
        .map(String::as_str)
        .map(parse_repository)
        .collect::<Result<Vec<_>>>()?;
    let artifacts = args
        .coordinates
        .iter()
        .map(|coordinate| {
            coordinate
                .parse::<Artifact>()
                .with_context(|| format!("Cannot parse artifact coordinate '{}'", coordinate))
        })
        .collect::<Result<Vec<_>>>()?;

    let open = environment.open()?;
    let manager = open.session().manager();
    let mut sync = open.session().sync_context(true);
    sync.acquire();

    let results = artifacts
        .into_par_iter()
        .map(|artifact| {
            let request = LocalArtifactRequest::new(artifact)
                .with_repositories(repositories.clone())
                .with_context(&args.context);
            manager.find(&request)
        })
        .collect::<Vec<_>>();
    sync.close();

    let mut outputs = Vec::with_capacity(results.len());
    for (coordinate, result) in args.coordinates.iter().zip(results) {
        let result = result.with_context(|| format!("Failed to look up {}", coordinate))?;
        outputs.push(FindOutput::new(coordinate, result));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        for output in &outputs {
            display_line(output);
        }
    }
    open.end()
}

fn display_line(output: &FindOutput) {
    match (output.available, &output.path) {
        (true, Some(path)) => println!(
            "{}: available from {} at {}",
            output.coordinate,
            output.repository.as_deref().unwrap_or("local"),
            path
        ),
        (false, Some(path)) => println!(
            "{}: not available from the requested repositories (found {})",
            output.coordinate, path
        ),
        _ => println!("{}: missing", output.coordinate),
    }
}
