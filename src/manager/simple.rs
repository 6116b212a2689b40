//! Manager of a plain local repository without provenance tracking.

use log::trace;

use super::{
    repository_key, LocalArtifactRegistration, LocalArtifactRequest, LocalArtifactResult,
    LocalRepositoryManager, LocalRepositoryManagerFactory, LOCAL_REPOSITORY_KEY,
};
use crate::artifact::{Artifact, LocalRepository, Metadata, RemoteRepository};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::path::PathComposer;

/// Repository types served by [`SimpleLocalRepositoryManagerFactory`].
pub const SIMPLE_TYPES: &[&str] = &["", "simple"];

/// Local repository manager that trusts whatever file sits at the expected
/// path
#[derive(Debug, Clone)]
pub struct SimpleLocalRepositoryManager {
    repository: LocalRepository,
    composer: PathComposer,
}

impl SimpleLocalRepositoryManager {
    pub fn new(repository: LocalRepository) -> Self {
        Self {
            repository,
            composer: PathComposer::new(),
        }
    }
}

impl LocalRepositoryManager for SimpleLocalRepositoryManager {
    fn repository(&self) -> &LocalRepository {
        &self.repository
    }

    fn path_for_local_artifact(&self, artifact: &Artifact) -> String {
        self.composer.path_for_artifact(artifact, true)
    }

    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        _repository: &RemoteRepository,
        _context: &str,
    ) -> String {
        self.composer.path_for_artifact(artifact, false)
    }

    fn path_for_local_metadata(&self, metadata: &Metadata) -> String {
        self.composer
            .path_for_metadata(metadata, LOCAL_REPOSITORY_KEY)
    }

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        context: &str,
    ) -> String {
        self.composer
            .path_for_metadata(metadata, &repository_key(repository, context))
    }

    fn find(&self, request: &LocalArtifactRequest) -> Result<LocalArtifactResult> {
        let file = self.resolve(&self.composer.path_for_artifact(&request.artifact, false));
        if file.is_file() {
            trace!("Found {} at {}", request.artifact, file.display());
            Ok(LocalArtifactResult {
                path: Some(file),
                available: true,
                repository: None,
            })
        } else {
            Ok(LocalArtifactResult::default())
        }
    }

    fn add(&self, _registration: &LocalArtifactRegistration) -> Result<()> {
        Ok(())
    }
}

/// Factory of [`SimpleLocalRepositoryManager`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleLocalRepositoryManagerFactory;

impl LocalRepositoryManagerFactory for SimpleLocalRepositoryManagerFactory {
    fn new_instance(
        &self,
        _config: &SessionConfig,
        repository: &LocalRepository,
    ) -> Result<Box<dyn LocalRepositoryManager>> {
        if !SIMPLE_TYPES.contains(&repository.content_type()) {
            return Err(Error::UnsupportedRepository {
                factory: "simple".to_string(),
                path: repository.base_path().to_path_buf(),
                content_type: repository.content_type().to_string(),
            });
        }
        Ok(Box::new(SimpleLocalRepositoryManager::new(repository.clone())))
    }
}
