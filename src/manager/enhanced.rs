//! # Enhanced Local Repository Manager
//!
//! Keeps a tracking file next to every cached artifact recording which
//! repositories the file was obtained from, keyed `"<file name>><repository
//! key>"`. The empty repository key marks a local install.
//!
//! A file found on disk is available for a request when its tracking record
//! has the local install key, or the key of one of the *requested*
//! repositories under the request's context, or no key at all for that file
//! name. The last case covers files placed by tools that do not track
//! provenance; they are treated as local installs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace};

use super::{
    prefixed, repository_key, LocalArtifactRegistration, LocalArtifactRequest,
    LocalArtifactResult, LocalRepositoryManager, LocalRepositoryManagerFactory,
    LOCAL_REPOSITORY_KEY,
};
use crate::artifact::{Artifact, LocalRepository, Metadata, RemoteRepository};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::path::PathComposer;
use crate::prefix::{self, PrefixComposer, PrefixComposerFactory};
use crate::selector::{ComponentRegistry, PrioritizedComponents};
use crate::tracking::{Changes, FileTrackingStore, Properties, TrackingStore};

/// Repository types served by [`EnhancedLocalRepositoryManagerFactory`].
pub const ENHANCED_TYPES: &[&str] = &["", "default", "enhanced"];

/// Repository key of locally installed files.
const LOCAL_INSTALL_KEY: &str = "";

/// Local repository manager with provenance tracking
#[derive(Debug)]
pub struct EnhancedLocalRepositoryManager {
    repository: LocalRepository,
    composer: PathComposer,
    prefixes: Box<dyn PrefixComposer>,
    tracking: Arc<dyn TrackingStore>,
    tracking_filename: String,
}

impl EnhancedLocalRepositoryManager {
    pub fn new(
        repository: LocalRepository,
        prefixes: Box<dyn PrefixComposer>,
        tracking: Arc<dyn TrackingStore>,
        tracking_filename: &str,
    ) -> Self {
        Self {
            repository,
            composer: PathComposer::new(),
            prefixes,
            tracking,
            tracking_filename: tracking_filename.to_string(),
        }
    }

    pub fn tracking_filename(&self) -> &str {
        &self.tracking_filename
    }

    /// Tracking file of the directory holding `file`.
    pub fn tracking_file(&self, file: &Path) -> Option<PathBuf> {
        file.parent().map(|dir| dir.join(&self.tracking_filename))
    }

    /// Repository keys of `repository` across `contexts`.
    fn repository_keys(&self, repository: &RemoteRepository, contexts: &[&str]) -> BTreeSet<String> {
        contexts
            .iter()
            .map(|context| repository_key(repository, context))
            .collect()
    }

    /// Checks one candidate location, filling `result` when a regular file
    /// is present there.
    fn check(
        &self,
        relative: &str,
        request: &LocalArtifactRequest,
        result: &mut LocalArtifactResult,
    ) -> Result<()> {
        let file = self.resolve(relative);
        if !file.is_file() {
            return Ok(());
        }
        let Some(name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(());
        };
        result.path = Some(file.clone());

        let properties = match self.tracking_file(&file) {
            Some(tracking) => self.tracking.read(&tracking)?,
            None => None,
        };
        let properties = properties.unwrap_or_default();

        if properties.contains_key(&entry_key(&name, LOCAL_INSTALL_KEY)) {
            trace!("{} is a local install", file.display());
            result.available = true;
            result.repository = None;
            return Ok(());
        }

        for repository in &request.repositories {
            let key = entry_key(&name, &repository_key(repository, &request.context));
            if properties.contains_key(&key) {
                trace!("{} was obtained from {}", file.display(), repository.id());
                result.available = true;
                result.repository = Some(repository.clone());
                return Ok(());
            }
        }

        if !is_tracked(&properties, &name) {
            trace!("{} is not tracked, treating it as a local install", file.display());
            result.available = true;
            result.repository = None;
        } else {
            debug!(
                "{} exists but was not obtained from any of the requested repositories",
                file.display()
            );
        }
        Ok(())
    }

    /// Registers `keys` for the file at `relative`.
    fn register(&self, relative: &str, keys: &BTreeSet<String>) -> Result<()> {
        let file = self.resolve(relative);
        let (Some(tracking), Some(name)) = (self.tracking_file(&file), file.file_name()) else {
            return Ok(());
        };
        let name = name.to_string_lossy();
        let changes: Changes = keys
            .iter()
            .map(|key| (entry_key(&name, key), Some(String::new())))
            .collect();
        self.tracking.update(&tracking, &changes)?;
        Ok(())
    }
}

impl LocalRepositoryManager for EnhancedLocalRepositoryManager {
    fn repository(&self) -> &LocalRepository {
        &self.repository
    }

    fn path_for_local_artifact(&self, artifact: &Artifact) -> String {
        prefixed(
            self.prefixes.prefix_for_local_artifact(artifact),
            self.composer.path_for_artifact(artifact, true),
        )
    }

    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
        _context: &str,
    ) -> String {
        prefixed(
            self.prefixes.prefix_for_remote_artifact(artifact, repository),
            self.composer.path_for_artifact(artifact, false),
        )
    }

    fn path_for_local_metadata(&self, metadata: &Metadata) -> String {
        prefixed(
            self.prefixes.prefix_for_local_metadata(metadata),
            self.composer.path_for_metadata(metadata, LOCAL_REPOSITORY_KEY),
        )
    }

    fn path_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
        context: &str,
    ) -> String {
        prefixed(
            self.prefixes.prefix_for_remote_metadata(metadata, repository),
            self.composer
                .path_for_metadata(metadata, &repository_key(repository, context)),
        )
    }

    fn find(&self, request: &LocalArtifactRequest) -> Result<LocalArtifactResult> {
        let artifact = &request.artifact;
        let mut result = LocalArtifactResult::default();

        if artifact.version() == artifact.base_version() {
            self.check(&self.path_for_local_artifact(artifact), request, &mut result)?;
        }
        if !result.available {
            for repository in &request.repositories {
                let relative = self.path_for_remote_artifact(artifact, repository, &request.context);
                self.check(&relative, request, &mut result)?;
                if result.available {
                    break;
                }
            }
        }
        Ok(result)
    }

    fn add(&self, registration: &LocalArtifactRegistration) -> Result<()> {
        let artifact = &registration.artifact;
        match &registration.repository {
            None => {
                let keys = BTreeSet::from([LOCAL_INSTALL_KEY.to_string()]);
                self.register(&self.path_for_local_artifact(artifact), &keys)?;
                debug!("Registered {} as a local install", artifact);
            }
            Some(repository) => {
                let contexts: Vec<&str> =
                    registration.contexts.iter().map(String::as_str).collect();
                if contexts.is_empty() {
                    debug!("No context given for {}, nothing registered", artifact);
                    return Ok(());
                }
                let keys = self.repository_keys(repository, &contexts);
                for context in &contexts {
                    let relative = self.path_for_remote_artifact(artifact, repository, context);
                    self.register(&relative, &keys)?;
                }
                debug!("Registered {} as obtained from {}", artifact, repository.id());
            }
        }
        Ok(())
    }
}

fn entry_key(file_name: &str, repository_key: &str) -> String {
    format!("{}>{}", file_name, repository_key)
}

/// True when the record holds any key for `file_name`.
fn is_tracked(properties: &Properties, file_name: &str) -> bool {
    let prefix = format!("{}>", file_name);
    properties.keys().any(|key| key.starts_with(&prefix))
}

/// Factory of [`EnhancedLocalRepositoryManager`]
///
/// The prefix composer of each manager is picked from a registry of prefix
/// composer factories by the component selector. All managers created by one
/// factory share its tracking store.
pub struct EnhancedLocalRepositoryManagerFactory {
    tracking: Arc<dyn TrackingStore>,
    prefixes: ComponentRegistry<dyn PrefixComposerFactory>,
}

impl Default for EnhancedLocalRepositoryManagerFactory {
    fn default() -> Self {
        Self::new(Arc::new(FileTrackingStore::new()), prefix::registry())
    }
}

impl EnhancedLocalRepositoryManagerFactory {
    pub fn new(
        tracking: Arc<dyn TrackingStore>,
        prefixes: ComponentRegistry<dyn PrefixComposerFactory>,
    ) -> Self {
        Self { tracking, prefixes }
    }
}

impl LocalRepositoryManagerFactory for EnhancedLocalRepositoryManagerFactory {
    fn new_instance(
        &self,
        config: &SessionConfig,
        repository: &LocalRepository,
    ) -> Result<Box<dyn LocalRepositoryManager>> {
        if !ENHANCED_TYPES.contains(&repository.content_type()) {
            return Err(Error::UnsupportedRepository {
                factory: "enhanced".to_string(),
                path: repository.base_path().to_path_buf(),
                content_type: repository.content_type().to_string(),
            });
        }
        let tracking_filename = config.tracking_filename()?;
        let candidates =
            PrioritizedComponents::rank(&self.prefixes, config, prefix::SELECTION_NAMESPACE)?;
        let selected = candidates.select(&format!("local repository {}", repository), |factory| {
            factory.create(config, repository)
        })?;
        Ok(Box::new(EnhancedLocalRepositoryManager::new(
            repository.clone(),
            selected.value,
            Arc::clone(&self.tracking),
            &tracking_filename,
        )))
    }
}
