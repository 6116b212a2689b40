//! # CLI Command Implementations
//!
//! Each subcommand of the `local-repo` tool lives in its own file with an
//! `Args` struct derived using `clap` and an `execute` function.
//!
//! All commands share an [`Environment`] built from the global options. It
//! loads the session configuration and opens a session over the local
//! repository, which selects the manager the same way a resolver would.

pub mod add;
pub mod find;
pub mod path;
pub mod tracking;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use url::Url;

use local_repo::artifact::{LocalRepository, RemoteRepository};
use local_repo::config::SessionConfig;
use local_repo::provider::LocalRepositoryProvider;
use local_repo::session::{RepositorySession, SessionRegistry};

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct Environment {
    pub local_repo: PathBuf,
    pub repo_type: String,
    pub config: Option<PathBuf>,
    pub defines: Vec<String>,
}

impl Environment {
    /// Configuration file contents with `-D` overrides applied.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let config = match &self.config {
            Some(path) => SessionConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => SessionConfig::new(),
        };
        Ok(config.with_overrides(self.defines.iter().map(String::as_str))?)
    }

    /// Opens a session over the local repository.
    pub fn open(&self) -> Result<OpenSession> {
        let repository = LocalRepository::new(&self.local_repo, &self.repo_type)?;
        let registry = SessionRegistry::default();
        let session = registry
            .open(
                self.session_config()?,
                &LocalRepositoryProvider::default(),
                &repository,
            )
            .with_context(|| format!("Failed to open local repository {}", repository))?;
        Ok(OpenSession { registry, session })
    }
}

/// A session together with the registry that has to end it
pub struct OpenSession {
    registry: SessionRegistry,
    session: RepositorySession,
}

impl OpenSession {
    pub fn session(&self) -> &RepositorySession {
        &self.session
    }

    pub fn end(self) -> Result<()> {
        Ok(self.registry.end(self.session)?)
    }
}

/// Parses `ID` or `ID=URL` into a remote repository.
pub fn parse_repository(value: &str) -> Result<RemoteRepository> {
    let (id, url) = match value.split_once('=') {
        Some((id, url)) => {
            let parsed = Url::parse(url)
                .with_context(|| format!("Invalid URL for repository '{}': {}", id, url))?;
            (id, parsed.to_string())
        }
        None => (value, String::new()),
    };
    if id.is_empty() {
        bail!("Repository id must not be empty in '{}'", value);
    }
    Ok(RemoteRepository::new(id, &url))
}
