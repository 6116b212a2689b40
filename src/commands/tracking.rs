//! # Tracking Command Implementation
//!
//! Maintenance of the tracking files of the local repository.
//!
//! ## Subcommands
//!
//! - **`show`**: Display the tracking record of one directory, grouped by file
//! - **`list`**: Walk the repository and list every tracking file
//! - **`reset`**: Delete the tracking file of one directory; its files become
//!   untracked and are treated as local installs afterwards

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use walkdir::WalkDir;

use local_repo::tracking::{FileTrackingStore, TrackingStore};

use super::Environment;

/// Inspect and maintain tracking files
#[derive(Args, Debug)]
pub struct TrackingArgs {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: TrackingSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TrackingSubcommand {
    /// Show the tracking record of a directory
    Show(ShowArgs),
    /// List all tracking files of the repository
    List(ListArgs),
    /// Delete the tracking file of a directory
    Reset(ResetArgs),
}

/// Arguments for the tracking show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Directory, absolute or relative to the local repository
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the tracking list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the tracking reset command
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Directory, absolute or relative to the local repository
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

/// A tracking file found by `tracking list`
#[derive(Debug, Serialize)]
struct TrackingEntry {
    directory: String,
    files: usize,
    entries: usize,
}

/// Execute the `tracking` command.
pub fn execute(args: TrackingArgs, environment: &Environment) -> Result<()> {
    let open = environment.open()?;
    let base = open.session().repository().base_path().to_path_buf();
    let filename = open.session().config().tracking_filename()?;
    let store = FileTrackingStore::new();

    match args.command {
        TrackingSubcommand::Show(show) => {
            let mut sync = open.session().sync_context(true);
            sync.acquire();
            execute_show(&store, &base.join(&show.dir).join(&filename), show.json)?;
        }
        TrackingSubcommand::List(list) => {
            let mut sync = open.session().sync_context(true);
            sync.acquire();
            execute_list(&store, &base, &filename, list.json)?;
        }
        TrackingSubcommand::Reset(reset) => {
            let mut sync = open.session().sync_context(false);
            sync.acquire();
            let path = base.join(&reset.dir).join(&filename);
            if store.delete(&path)? {
                println!("Deleted {}", path.display());
            } else {
                println!("No tracking file at {}", path.display());
            }
        }
    }
    open.end()
}

/// Groups `file>repository` keys by file name.
fn group_by_file(properties: &BTreeMap<String, String>) -> BTreeMap<&str, Vec<&str>> {
    let mut files: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for key in properties.keys() {
        if let Some((file, repository)) = key.split_once('>') {
            files.entry(file).or_default().push(repository);
        }
    }
    files
}

/// Execute the `tracking show` command.
fn execute_show(store: &FileTrackingStore, path: &Path, json: bool) -> Result<()> {
    let Some(properties) = store.read(path)? else {
        if json {
            println!("{{}}");
        } else {
            println!("No tracking file at {}", path.display());
        }
        return Ok(());
    };
    let files = group_by_file(&properties);

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }
    println!("{}", path.display());
    for (file, repositories) in &files {
        let origins: Vec<&str> = repositories
            .iter()
            .map(|r| if r.is_empty() { "(local install)" } else { *r })
            .collect();
        println!("  {}: {}", file, origins.join(", "));
    }
    Ok(())
}

/// Execute the `tracking list` command.
fn execute_list(store: &FileTrackingStore, base: &Path, filename: &str, json: bool) -> Result<()> {
    let mut entries = Vec::new();
    if base.is_dir() {
        for entry in WalkDir::new(base).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", base.display()))?;
            if !entry.file_type().is_file() || entry.file_name() != filename {
                continue;
            }
            let properties = store.read(entry.path())?.unwrap_or_default();
            let directory = entry
                .path()
                .parent()
                .and_then(|dir| dir.strip_prefix(base).ok())
                .map(|dir| dir.display().to_string())
                .unwrap_or_default();
            entries.push(TrackingEntry {
                directory,
                files: group_by_file(&properties).len(),
                entries: properties.len(),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No tracking files found in: {}", base.display());
    } else {
        for entry in &entries {
            println!(
                "{}  {} file(s), {} entr{}",
                entry.directory,
                entry.files,
                entry.entries,
                if entry.entries == 1 { "y" } else { "ies" }
            );
        }
    }
    Ok(())
}
