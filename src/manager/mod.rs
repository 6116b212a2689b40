//! # Local Repository Managers
//!
//! A [`LocalRepositoryManager`] is the `find`/`add` façade over one local
//! repository. It computes where an artifact or metadata document lives, says
//! whether a cached copy is acceptable for a given request, and records where
//! newly placed files came from.
//!
//! Two implementations are provided:
//!
//! - [`simple::SimpleLocalRepositoryManager`]: plain layout, no provenance.
//!   Any file at the expected path is available.
//! - [`enhanced::EnhancedLocalRepositoryManager`]: optional path prefixes and
//!   per-directory tracking files. A cached file is only available to requests
//!   naming a repository it was downloaded from, unless it was installed
//!   locally or is not tracked at all.
//!
//! Managers are built by a [`LocalRepositoryManagerFactory`]; which factory
//! serves a repository is decided by the component selector (see
//! [`crate::provider`]).

pub mod enhanced;
pub mod simple;

use std::fmt;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::artifact::{Artifact, LocalRepository, Metadata, RemoteRepository};
use crate::config::SessionConfig;
use crate::error::Result;

pub use enhanced::{EnhancedLocalRepositoryManager, EnhancedLocalRepositoryManagerFactory};
pub use simple::{SimpleLocalRepositoryManager, SimpleLocalRepositoryManagerFactory};

/// Repository key used for metadata of the local repository itself.
pub const LOCAL_REPOSITORY_KEY: &str = "local";

/// Lookup of an artifact in the local repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifactRequest {
    pub artifact: Artifact,
    /// Remote repositories the caller would accept the artifact from, in order
    pub repositories: Vec<RemoteRepository>,
    /// Resolution context, e.g. `project` or `plugin`
    pub context: String,
}

impl LocalArtifactRequest {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            repositories: Vec::new(),
            context: String::new(),
        }
    }

    pub fn with_repositories(mut self, repositories: Vec<RemoteRepository>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = context.to_string();
        self
    }
}

/// Outcome of [`LocalRepositoryManager::find`]
///
/// `path` is set whenever a regular file was found at a candidate location,
/// even if that file is not acceptable for the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalArtifactResult {
    pub path: Option<PathBuf>,
    pub available: bool,
    /// The requested repository the file was accepted from, `None` for local
    /// installs and untracked files
    pub repository: Option<RemoteRepository>,
}

/// Registration of an artifact file already placed in the local repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifactRegistration {
    pub artifact: Artifact,
    /// Source of the file, `None` for a local install
    pub repository: Option<RemoteRepository>,
    /// Contexts the file is valid for; with none, nothing is registered
    pub contexts: Vec<String>,
}

impl LocalArtifactRegistration {
    /// Registration of a locally installed artifact.
    pub fn local(artifact: Artifact) -> Self {
        Self {
            artifact,
            repository: None,
            contexts: Vec::new(),
        }
    }

    /// Registration of an artifact downloaded from `repository`.
    pub fn remote(artifact: Artifact, repository: RemoteRepository, contexts: Vec<String>) -> Self {
        Self {
            artifact,
            repository: Some(repository),
            contexts,
        }
    }
}

/// Lookup of a metadata document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMetadataRequest {
    pub metadata: Metadata,
    /// Owning repository, `None` for metadata of the local repository
    pub repository: Option<RemoteRepository>,
    pub context: String,
}

impl LocalMetadataRequest {
    pub fn new(metadata: Metadata, repository: Option<RemoteRepository>, context: &str) -> Self {
        Self {
            metadata,
            repository,
            context: context.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalMetadataResult {
    pub path: Option<PathBuf>,
}

/// Registration of a metadata document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMetadataRegistration {
    pub metadata: Metadata,
    pub repository: Option<RemoteRepository>,
    pub contexts: Vec<String>,
}

/// Manages the content of one local repository
pub trait LocalRepositoryManager: Send + Sync + fmt::Debug {
    fn repository(&self) -> &LocalRepository;

    /// Relative path of a locally installed artifact.
    fn path_for_local_artifact(&self, artifact: &Artifact) -> String;

    /// Relative path of an artifact downloaded from `repository`.
    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
        context: &str,
    ) -> String;

    /// Relative path of metadata owned by the local repository.
    fn path_for_local_metadata(&self, metadata: &Metadata) -> String;

    /// Relative path of metadata downloaded from `repository`.
    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        context: &str,
    ) -> String;

    /// Looks up a cached artifact. A miss is an unavailable result, not an
    /// error; errors are tracking failures.
    fn find(&self, request: &LocalArtifactRequest) -> Result<LocalArtifactResult>;

    /// Records the provenance of an artifact file. Registering the same
    /// artifact twice is harmless.
    fn add(&self, registration: &LocalArtifactRegistration) -> Result<()>;

    fn find_metadata(&self, request: &LocalMetadataRequest) -> Result<LocalMetadataResult> {
        let relative = match &request.repository {
            Some(repository) => {
                self.path_for_remote_metadata(&request.metadata, repository, &request.context)
            }
            None => self.path_for_local_metadata(&request.metadata),
        };
        let file = self.resolve(&relative);
        Ok(LocalMetadataResult {
            path: file.is_file().then_some(file),
        })
    }

    /// Metadata is not tracked.
    fn add_metadata(&self, _registration: &LocalMetadataRegistration) -> Result<()> {
        Ok(())
    }

    /// Absolute location of a relative repository path.
    fn resolve(&self, relative: &str) -> PathBuf {
        self.repository().base_path().join(relative)
    }
}

/// Builds managers for the local repository types it supports
pub trait LocalRepositoryManagerFactory: Send + Sync {
    /// Creates a manager, or fails with
    /// [`crate::error::Error::UnsupportedRepository`] when the repository
    /// type is not served by this factory.
    fn new_instance(
        &self,
        config: &SessionConfig,
        repository: &LocalRepository,
    ) -> Result<Box<dyn LocalRepositoryManager>>;
}

/// Key identifying `repository` in tracking files and metadata file names.
///
/// Static repositories are keyed by id. A repository manager serves
/// different content depending on the context and on the repositories it
/// mirrors, so its key also carries a digest of both.
pub fn repository_key(repository: &RemoteRepository, context: &str) -> String {
    if !repository.is_repository_manager() {
        return repository.id().to_string();
    }
    let mut mirrored: Vec<&str> = repository.mirrored().iter().map(|r| r.id()).collect();
    mirrored.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(context.as_bytes());
    for id in mirrored {
        hasher.update(b"\n");
        hasher.update(id.as_bytes());
    }
    format!("{}-{}", repository.id(), hex::encode(hasher.finalize()))
}

/// `prefix/path`, or `path` alone when there is no prefix.
pub(crate) fn prefixed(prefix: Option<String>, path: String) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}/{}", prefix, path),
        _ => path,
    }
}
